use super::types::Post;
use crate::blog::Category;
use crate::slug::slugify;
use serde::Serialize;

/// Category slug a post is listed under. Database posts store a slug,
/// file posts carry a display label; both go through `slugify` so labels
/// saved before slugs were enforced still resolve.
pub fn post_category_slug(post: &Post) -> Option<String> {
    let slug = slugify(post.category()?);
    (!slug.is_empty()).then_some(slug)
}

pub fn filter_by_category(posts: Vec<Post>, category_slug: &str) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| post_category_slug(post).as_deref() == Some(category_slug))
        .collect()
}

/// Display name for a category page: the stored category when one exists,
/// otherwise the label of the first matching file post.
pub fn resolve_category_name(
    category_slug: &str,
    categories: &[Category],
    matching: &[Post],
) -> Option<String> {
    categories
        .iter()
        .find(|c| c.slug == category_slug)
        .map(|c| c.name.clone())
        .or_else(|| {
            matching.iter().find_map(|post| match post {
                Post::File(review) => review.category.clone(),
                Post::Database(_) => None,
            })
        })
}

/// A category that has at least one post, as shown in navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLink {
    pub slug: String,
    pub name: String,
}

/// Categories with at least one post, sorted by display name. Stored
/// categories without posts are left out so no link leads to an empty page.
pub fn category_links(categories: &[Category], posts: &[Post]) -> Vec<CategoryLink> {
    let mut links: Vec<CategoryLink> = Vec::new();
    for post in posts {
        let Some(slug) = post_category_slug(post) else {
            continue;
        };
        if links.iter().any(|link| link.slug == slug) {
            continue;
        }
        let name = resolve_category_name(&slug, categories, std::slice::from_ref(post))
            .unwrap_or_else(|| slug.clone());
        links.push(CategoryLink { slug, name });
    }
    links.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    links
}

/// Slugs of every category with at least one post, sorted.
pub fn category_slugs(posts: &[Post]) -> Vec<String> {
    let mut slugs: Vec<String> = posts.iter().filter_map(post_category_slug).collect();
    slugs.sort();
    slugs.dedup();
    slugs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::{ArticleType, BlogPost, PostStatus, ReviewBlocks, SeoFields};
    use crate::reviews::ReviewSummary;
    use chrono::Utc;

    fn file_post(slug: &str, category: Option<&str>) -> Post {
        Post::File(ReviewSummary {
            slug: slug.to_string(),
            title: slug.to_string(),
            excerpt: String::new(),
            cover_image: None,
            category: category.map(str::to_string),
            date: None,
            is_review: false,
        })
    }

    fn db_post(slug: &str, category: Option<&str>) -> Post {
        let now = Utc::now();
        Post::Database(BlogPost {
            id: slug.to_string(),
            title: slug.to_string(),
            slug: slug.to_string(),
            content: String::new(),
            excerpt: String::new(),
            cover_image: None,
            category: category.map(str::to_string),
            status: PostStatus::Published,
            article_type: ArticleType::Sales,
            author: None,
            seo: SeoFields::default(),
            product: None,
            blocks: ReviewBlocks::default(),
            created_at: now,
            updated_at: now,
            published_at: Some(now),
        })
    }

    #[test]
    fn test_matches_both_sources() {
        let posts = vec![
            file_post("lampada", Some("Casa Inteligente")),
            db_post("tomada", Some("casa-inteligente")),
            file_post("batom", Some("Beleza & Autocuidado")),
            db_post("sem-categoria", None),
        ];

        let matching = filter_by_category(posts, "casa-inteligente");
        let slugs: Vec<&str> = matching.iter().map(Post::slug).collect();
        assert_eq!(slugs, vec!["lampada", "tomada"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let posts = vec![file_post("a", Some("Tech"))];
        assert!(filter_by_category(posts, "inexistente").is_empty());
    }

    #[test]
    fn test_category_name_prefers_stored_category() {
        let stored = vec![Category {
            id: "1".to_string(),
            name: "Casa Inteligente".to_string(),
            slug: "casa-inteligente".to_string(),
            description: None,
        }];
        let matching = vec![file_post("a", Some("casa inteligente"))];

        assert_eq!(
            resolve_category_name("casa-inteligente", &stored, &matching).as_deref(),
            Some("Casa Inteligente")
        );
        assert_eq!(
            resolve_category_name("casa-inteligente", &[], &matching).as_deref(),
            Some("casa inteligente")
        );
        assert_eq!(resolve_category_name("x", &[], &[]), None);
    }

    #[test]
    fn test_category_slugs_are_unique() {
        let posts = vec![
            file_post("a", Some("Tech")),
            file_post("b", Some("Beleza & Autocuidado")),
            db_post("c", Some("tech")),
            file_post("d", Some("   ")),
        ];

        assert_eq!(category_slugs(&posts), vec!["beleza-autocuidado", "tech"]);
    }

    #[test]
    fn test_category_links_skip_empty_categories() {
        let stored = vec![
            Category {
                id: "1".to_string(),
                name: "Tech & Gadgets".to_string(),
                slug: "tech-gadgets".to_string(),
                description: None,
            },
            Category {
                id: "2".to_string(),
                name: "Vazia".to_string(),
                slug: "vazia".to_string(),
                description: None,
            },
        ];
        let posts = vec![
            db_post("a", Some("tech-gadgets")),
            file_post("b", Some("Casa Inteligente")),
            file_post("c", Some("casa inteligente")),
        ];

        assert_eq!(
            category_links(&stored, &posts),
            vec![
                CategoryLink {
                    slug: "casa-inteligente".to_string(),
                    name: "Casa Inteligente".to_string(),
                },
                CategoryLink {
                    slug: "tech-gadgets".to_string(),
                    name: "Tech & Gadgets".to_string(),
                },
            ]
        );
    }
}
