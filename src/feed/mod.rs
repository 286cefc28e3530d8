pub mod category;
pub mod handlers;
pub mod merge;
pub mod types;

pub use category::{
    CategoryLink, category_links, category_slugs, filter_by_category, post_category_slug,
    resolve_category_name,
};
pub use merge::{FeedOrder, merge, merge_ordered};
pub use types::{ArticleDetail, DEFAULT_CATEGORY_LABEL, LegacyPost, Origin, Post, PostCard};

use crate::blog::{Category, PostRepository};
use crate::reviews::ReviewsLibrary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub order: FeedOrder,
}

/// Posts matching one category, with the name to display for it.
#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub posts: Vec<Post>,
    pub categories: Vec<Category>,
    pub links: Vec<CategoryLink>,
}

/// Public read side: merges published database posts with file reviews.
#[derive(Clone)]
pub struct Feed {
    posts: PostRepository,
    reviews: Arc<ReviewsLibrary>,
    order: FeedOrder,
}

impl Feed {
    pub fn new(posts: PostRepository, reviews: Arc<ReviewsLibrary>, config: &FeedConfig) -> Self {
        Self {
            posts,
            reviews,
            order: config.order,
        }
    }

    /// Every published post from both sources.
    pub async fn home(&self) -> Vec<Post> {
        let (database, files) = tokio::join!(self.posts.get_posts(true), self.reviews.list_reviews());
        debug!(
            "Merging {} database posts with {} file reviews",
            database.len(),
            files.len()
        );
        merge_ordered(database, files, self.order)
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.posts.get_categories().await
    }

    /// `None` when no post from either source is in the category.
    pub async fn category(&self, category_slug: &str) -> Option<CategoryPage> {
        let (posts, categories) = tokio::join!(self.home(), self.categories());
        let links = category_links(&categories, &posts);
        let matching = filter_by_category(posts, category_slug);
        if matching.is_empty() {
            return None;
        }

        let name = resolve_category_name(category_slug, &categories, &matching)
            .unwrap_or_else(|| category_slug.to_string());
        let description = categories
            .iter()
            .find(|c| c.slug == category_slug)
            .and_then(|c| c.description.clone());

        Some(CategoryPage {
            slug: category_slug.to_string(),
            name,
            description,
            posts: matching,
            categories,
            links,
        })
    }

    /// Full article by slug, database first.
    pub async fn detail(&self, slug: &str) -> Option<ArticleDetail> {
        if let Some(post) = self.posts.get_post_by_slug(slug, true).await {
            return Some(ArticleDetail::Database(post));
        }
        self.reviews.get_review(slug).await.map(ArticleDetail::File)
    }

    /// Slugs of every published article, each once.
    pub async fn all_slugs(&self) -> Vec<String> {
        self.home()
            .await
            .iter()
            .map(|post| post.slug().to_string())
            .collect()
    }

    /// Navigation entries: categories that have at least one published post.
    pub async fn category_links(&self) -> Vec<CategoryLink> {
        let (posts, categories) = tokio::join!(self.home(), self.categories());
        category_links(&categories, &posts)
    }

    pub async fn category_slugs(&self) -> Vec<String> {
        category_slugs(&self.home().await)
    }
}
