use super::{ArticleDetail, PostCard, category_links};
use crate::AppState;
use crate::blog::{ArticleType, CaptionedImage, CriterionRating, FaqEntry};
use crate::seo::PageMeta;
use crate::templating::to_liquid;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Article data exposed to the article template, whichever source it came
/// from.
#[derive(Debug, Serialize)]
pub struct ArticleView {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub html_content: String,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub category_slug: Option<String>,
    pub author: Option<String>,
    pub date_formatted: Option<String>,
    pub updated_formatted: Option<String>,
    pub article_type: ArticleType,
    pub origin: &'static str,
    pub product: Option<ProductView>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub faq: Vec<FaqEntry>,
    pub images: Vec<CaptionedImage>,
    pub ratings: Vec<CriterionRating>,
    pub verdict: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub name: String,
    pub price: Option<String>,
    pub rating: Option<f64>,
    pub affiliate_link: Option<String>,
}

const DATE_FORMAT: &str = "%d/%m/%Y";

impl ArticleView {
    pub fn new(detail: &ArticleDetail, category_name: Option<String>) -> Self {
        match detail {
            ArticleDetail::Database(post) => Self {
                slug: post.slug.clone(),
                title: post.title.clone(),
                excerpt: post.excerpt.clone(),
                html_content: post.content.clone(),
                cover_image: post.cover_image.clone(),
                category: category_name.or_else(|| post.category.clone()),
                category_slug: post.category.clone(),
                author: post.author.clone(),
                date_formatted: Some(post.display_date().format(DATE_FORMAT).to_string()),
                updated_formatted: Some(post.updated_at.format(DATE_FORMAT).to_string()),
                article_type: post.article_type,
                origin: detail.origin().as_str(),
                product: post.product.as_ref().map(|p| ProductView {
                    name: p.name.clone(),
                    price: p.price.map(format_price),
                    rating: p.rating,
                    affiliate_link: p.affiliate_link.clone(),
                }),
                pros: post.blocks.pros.clone(),
                cons: post.blocks.cons.clone(),
                faq: post.blocks.faq.clone(),
                images: post.blocks.images.clone(),
                ratings: post.blocks.ratings.clone(),
                verdict: post.blocks.verdict.clone(),
            },
            ArticleDetail::File(review) => {
                let front = &review.front_matter;
                let category_slug = front
                    .category
                    .as_deref()
                    .map(crate::slug::slugify)
                    .filter(|s| !s.is_empty());
                Self {
                    slug: review.slug.clone(),
                    title: review.title.clone(),
                    excerpt: front.excerpt.clone().unwrap_or_default(),
                    html_content: review.html_content.clone(),
                    cover_image: front.featured_image.clone(),
                    category: front.category.clone(),
                    category_slug,
                    author: front.author.clone(),
                    date_formatted: review.date.map(|d| d.format(DATE_FORMAT).to_string()),
                    updated_formatted: front
                        .updated_at
                        .as_deref()
                        .and_then(|d| crate::reviews::core::parse_date(d).ok())
                        .map(|d| d.format(DATE_FORMAT).to_string()),
                    article_type: if front.is_review {
                        ArticleType::Sales
                    } else {
                        ArticleType::Educational
                    },
                    origin: detail.origin().as_str(),
                    product: front.is_review.then(|| ProductView {
                        name: front
                            .product_name
                            .clone()
                            .unwrap_or_else(|| review.title.clone()),
                        price: front
                            .product_price
                            .as_deref()
                            .map(|p| match p.replace(',', ".").parse::<f64>() {
                                Ok(value) => format_price(value),
                                Err(_) => p.to_string(),
                            }),
                        rating: front.rating,
                        affiliate_link: front.affiliate_link.clone(),
                    }),
                    pros: front.pros.clone(),
                    cons: front.cons.clone(),
                    faq: Vec::new(),
                    images: Vec::new(),
                    ratings: Vec::new(),
                    verdict: front.verdict.clone(),
                }
            }
        }
    }
}

/// Brazilian currency formatting: `R$ 1.299,90`.
pub fn format_price(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let (whole, fraction) = (cents.abs() / 100, cents.abs() % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if cents < 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, fraction)
}

fn page_globals(app_state: &AppState, meta: &PageMeta) -> liquid::Object {
    liquid::object!({
        "site_name": app_state.config.app.name.clone(),
        "base_url": app_state.base_url(),
        "page_title": meta.title.clone(),
        "meta_description": meta.description.clone(),
        "meta_keywords": meta.keywords.join(", "),
        "canonical_url": meta.canonical_url.clone(),
        "og_title": meta.og_title.clone(),
        "og_description": meta.og_description.clone(),
        "og_image": meta.og_image.clone(),
        "og_type": meta.og_type.clone(),
        "og_url": meta.canonical_url.clone(),
        "json_ld": meta.json_ld.clone(),
    })
}

async fn render(app_state: &AppState, template: &str, globals: liquid::Object) -> Response {
    match app_state
        .template_engine
        .render_template(template, globals)
        .await
    {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template rendering error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

pub async fn home_handler(State(app_state): State<AppState>) -> Response {
    let (posts, categories) = tokio::join!(app_state.feed.home(), app_state.feed.categories());
    let url_prefix = &app_state.config.reviews.url_prefix;
    let cards: Vec<PostCard> = posts
        .iter()
        .map(|post| PostCard::new(post, &categories, url_prefix))
        .collect();

    let app = &app_state.config.app;
    let meta = PageMeta::listing(
        &app.name,
        &app.description,
        format!("{}/", app_state.base_url()),
    );

    let mut globals = page_globals(&app_state, &meta);
    globals.insert("posts".into(), to_liquid(&cards));
    globals.insert(
        "categories".into(),
        to_liquid(&category_links(&categories, &posts)),
    );

    render(&app_state, &app_state.config.templates.index_template, globals).await
}

pub async fn category_handler(
    State(app_state): State<AppState>,
    Path(category_slug): Path<String>,
) -> Response {
    let Some(page) = app_state.feed.category(&category_slug).await else {
        return (StatusCode::NOT_FOUND, "Category not found").into_response();
    };

    let url_prefix = &app_state.config.reviews.url_prefix;
    let cards: Vec<PostCard> = page
        .posts
        .iter()
        .map(|post| PostCard::new(post, &page.categories, url_prefix))
        .collect();

    let description = page
        .description
        .clone()
        .unwrap_or_else(|| format!("{}: reviews e dicas", page.name));
    let meta = PageMeta::listing(
        &format!("{} | {}", page.name, app_state.config.app.name),
        &description,
        format!("{}/categories/{}", app_state.base_url(), page.slug),
    );

    let mut globals = page_globals(&app_state, &meta);
    globals.insert("posts".into(), to_liquid(&cards));
    globals.insert("categories".into(), to_liquid(&page.links));
    globals.insert(
        "category".into(),
        to_liquid(&serde_json::json!({
            "slug": page.slug,
            "name": page.name,
            "description": page.description,
        })),
    );

    render(
        &app_state,
        &app_state.config.templates.category_template,
        globals,
    )
    .await
}

pub async fn article_handler(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    let Some(detail) = app_state.feed.detail(&slug).await else {
        return (StatusCode::NOT_FOUND, "Post not found").into_response();
    };

    let category_name = match &detail {
        ArticleDetail::Database(post) => match post.category.as_deref() {
            Some(category_slug) => app_state
                .posts
                .get_category_by_slug(category_slug)
                .await
                .map(|c| c.name),
            None => None,
        },
        ArticleDetail::File(_) => None,
    };

    let url = format!(
        "{}{}/{}",
        app_state.base_url(),
        app_state.config.reviews.url_prefix.trim_end_matches('/'),
        detail.slug()
    );
    let meta = PageMeta::article(&detail, &app_state.config.app.name, url);
    let article = ArticleView::new(&detail, category_name);

    let links = app_state.feed.category_links().await;
    let mut globals = page_globals(&app_state, &meta);
    globals.insert("article".into(), to_liquid(&article));
    globals.insert("categories".into(), to_liquid(&links));

    render(
        &app_state,
        &app_state.config.templates.article_template,
        globals,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(349.9), "R$ 349,90");
        assert_eq!(format_price(1299.9), "R$ 1.299,90");
        assert_eq!(format_price(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_price(0.0), "R$ 0,00");
    }
}
