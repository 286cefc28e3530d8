use crate::blog::{ArticleType, BlogPost};
use crate::feed::ArticleDetail;
use crate::reviews::Review;
use serde::Serialize;
use serde_json::{Value, json};

/// Head metadata for one rendered page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical_url: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: Option<String>,
    pub og_type: String,
    /// Serialized structured data, safe to embed inside a `<script>` tag.
    pub json_ld: Option<String>,
}

impl PageMeta {
    pub fn listing(title: &str, description: &str, url: String) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            keywords: Vec::new(),
            canonical_url: url,
            og_title: title.to_string(),
            og_description: description.to_string(),
            og_image: None,
            og_type: "website".to_string(),
            json_ld: None,
        }
    }

    pub fn article(detail: &ArticleDetail, site_name: &str, url: String) -> Self {
        match detail {
            ArticleDetail::Database(post) => Self::database_article(post, site_name, url),
            ArticleDetail::File(review) => Self::file_article(review, site_name, url),
        }
    }

    fn database_article(post: &BlogPost, site_name: &str, url: String) -> Self {
        let seo = &post.seo;
        let title = non_blank(&seo.meta_title)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} | {}", post.title, site_name));
        let description = non_blank(&seo.meta_description)
            .unwrap_or(&post.excerpt)
            .to_string();
        let canonical_url = non_blank(&seo.canonical_url)
            .map(str::to_string)
            .unwrap_or_else(|| url.clone());

        Self {
            og_title: non_blank(&seo.og_title)
                .map(str::to_string)
                .unwrap_or_else(|| title.clone()),
            og_description: non_blank(&seo.og_description)
                .map(str::to_string)
                .unwrap_or_else(|| description.clone()),
            og_image: non_blank(&seo.og_image)
                .or(post.cover_image.as_deref())
                .map(str::to_string),
            og_type: "article".to_string(),
            json_ld: Some(script_safe(&database_json_ld(post, site_name, &canonical_url))),
            keywords: seo.keywords.clone(),
            title,
            description,
            canonical_url,
        }
    }

    fn file_article(review: &Review, site_name: &str, url: String) -> Self {
        let front = &review.front_matter;
        let title = format!("{} | {}", review.title, site_name);
        let description = front.excerpt.clone().unwrap_or_default();

        Self {
            og_title: title.clone(),
            og_description: description.clone(),
            og_image: front.featured_image.clone(),
            og_type: "article".to_string(),
            json_ld: Some(script_safe(&file_json_ld(review, site_name, &url))),
            keywords: Vec::new(),
            title,
            description,
            canonical_url: url,
        }
    }
}

/// schema.org structured data: `Product` with an offer and review for sales
/// articles, `BlogPosting` for everything else.
pub fn database_json_ld(post: &BlogPost, site_name: &str, url: &str) -> Value {
    match (&post.article_type, &post.product) {
        (ArticleType::Sales, Some(product)) => product_json_ld(ProductLd {
            name: if product.name.is_empty() {
                post.title.as_str()
            } else {
                product.name.as_str()
            },
            image: post.cover_image.as_deref(),
            description: &post.excerpt,
            price: product.price,
            rating: product.rating,
            offer_url: product.affiliate_link.as_deref().unwrap_or(url),
            author: post.author.as_deref().unwrap_or(site_name),
        }),
        _ => json!({
            "@context": "https://schema.org",
            "@type": "BlogPosting",
            "headline": post.title,
            "description": post.excerpt,
            "image": post.cover_image,
            "datePublished": post.display_date().to_rfc3339(),
            "dateModified": post.updated_at.to_rfc3339(),
            "author": { "@type": "Person", "name": post.author.as_deref().unwrap_or(site_name) },
            "publisher": { "@type": "Organization", "name": site_name },
            "mainEntityOfPage": url,
        }),
    }
}

pub fn file_json_ld(review: &Review, site_name: &str, url: &str) -> Value {
    let front = &review.front_matter;
    if front.is_review {
        return product_json_ld(ProductLd {
            name: front.product_name.as_deref().unwrap_or(&review.title),
            image: front.featured_image.as_deref(),
            description: front.excerpt.as_deref().unwrap_or_default(),
            price: front
                .product_price
                .as_deref()
                .and_then(|p| p.replace(',', ".").parse().ok()),
            rating: front.rating,
            offer_url: front.affiliate_link.as_deref().unwrap_or(url),
            author: front.author.as_deref().unwrap_or(site_name),
        });
    }

    json!({
        "@context": "https://schema.org",
        "@type": "BlogPosting",
        "headline": review.title,
        "description": front.excerpt,
        "image": front.featured_image,
        "datePublished": review.date.map(|d| d.to_rfc3339()),
        "author": { "@type": "Person", "name": front.author.as_deref().unwrap_or(site_name) },
        "publisher": { "@type": "Organization", "name": site_name },
        "mainEntityOfPage": url,
    })
}

struct ProductLd<'a> {
    name: &'a str,
    image: Option<&'a str>,
    description: &'a str,
    price: Option<f64>,
    rating: Option<f64>,
    offer_url: &'a str,
    author: &'a str,
}

fn product_json_ld(product: ProductLd<'_>) -> Value {
    let mut ld = json!({
        "@context": "https://schema.org",
        "@type": "Product",
        "name": product.name,
        "image": product.image,
        "description": product.description,
    });

    if let Some(price) = product.price {
        ld["offers"] = json!({
            "@type": "Offer",
            "price": format!("{:.2}", price),
            "priceCurrency": "BRL",
            "availability": "https://schema.org/InStock",
            "url": product.offer_url,
        });
    }
    if let Some(rating) = product.rating {
        ld["review"] = json!({
            "@type": "Review",
            "reviewRating": {
                "@type": "Rating",
                "ratingValue": rating,
                "bestRating": 5,
            },
            "author": { "@type": "Person", "name": product.author },
        });
    }

    ld
}

/// JSON text that cannot terminate the surrounding `<script>` element.
fn script_safe(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::{PostStatus, ProductInfo, ReviewBlocks, SeoFields};
    use chrono::Utc;

    fn post(article_type: ArticleType) -> BlogPost {
        let now = Utc::now();
        BlogPost {
            id: "1".to_string(),
            title: "Robô Aspirador X".to_string(),
            slug: "robo-aspirador-x".to_string(),
            content: "<p>ok</p>".to_string(),
            excerpt: "Resumo".to_string(),
            cover_image: Some("https://cdn/x.jpg".to_string()),
            category: None,
            status: PostStatus::Published,
            article_type,
            author: Some("Isa".to_string()),
            seo: SeoFields::default(),
            product: Some(ProductInfo {
                name: "Robô X".to_string(),
                price: Some(1299.9),
                rating: Some(4.5),
                affiliate_link: Some("https://amzn.to/x".to_string()),
            }),
            blocks: ReviewBlocks::default(),
            created_at: now,
            updated_at: now,
            published_at: Some(now),
        }
    }

    #[test]
    fn test_title_falls_back_to_site_suffix() {
        let meta = PageMeta::article(
            &ArticleDetail::Database(post(ArticleType::Educational)),
            "Vitrine",
            "https://site/reviews/robo-aspirador-x".to_string(),
        );
        assert_eq!(meta.title, "Robô Aspirador X | Vitrine");
        assert_eq!(meta.description, "Resumo");
        assert_eq!(meta.og_image.as_deref(), Some("https://cdn/x.jpg"));
        assert_eq!(meta.canonical_url, "https://site/reviews/robo-aspirador-x");
    }

    #[test]
    fn test_seo_overrides() {
        let mut p = post(ArticleType::Educational);
        p.seo = SeoFields {
            meta_title: Some("Título SEO".to_string()),
            meta_description: Some("Descrição SEO".to_string()),
            keywords: vec!["robô".to_string()],
            canonical_url: Some("https://outro/x".to_string()),
            og_title: Some("OG".to_string()),
            ..SeoFields::default()
        };
        let meta = PageMeta::article(&ArticleDetail::Database(p), "Vitrine", String::new());

        assert_eq!(meta.title, "Título SEO");
        assert_eq!(meta.description, "Descrição SEO");
        assert_eq!(meta.og_title, "OG");
        assert_eq!(meta.og_description, "Descrição SEO");
        assert_eq!(meta.canonical_url, "https://outro/x");
        assert_eq!(meta.keywords, vec!["robô"]);
    }

    #[test]
    fn test_sales_article_is_a_product() {
        let ld = database_json_ld(&post(ArticleType::Sales), "Vitrine", "https://site/x");
        assert_eq!(ld["@type"], "Product");
        assert_eq!(ld["name"], "Robô X");
        assert_eq!(ld["offers"]["priceCurrency"], "BRL");
        assert_eq!(ld["offers"]["price"], "1299.90");
        assert_eq!(ld["offers"]["url"], "https://amzn.to/x");
        assert_eq!(ld["review"]["reviewRating"]["bestRating"], 5);
    }

    #[test]
    fn test_educational_article_is_a_blog_posting() {
        let ld = database_json_ld(&post(ArticleType::Educational), "Vitrine", "https://site/x");
        assert_eq!(ld["@type"], "BlogPosting");
        assert_eq!(ld["headline"], "Robô Aspirador X");
    }

    #[test]
    fn test_json_ld_cannot_close_script() {
        let mut p = post(ArticleType::Educational);
        p.title = "</script><script>alert(1)</script>".to_string();
        let meta = PageMeta::article(&ArticleDetail::Database(p), "Vitrine", String::new());
        assert!(!meta.json_ld.unwrap().contains("</script>"));
    }
}
