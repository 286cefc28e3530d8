use crate::blog::{ArticleType, BlogPost, Category};
use crate::reviews::{Review, ReviewSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label shown on cards whose post carries no category.
pub const DEFAULT_CATEGORY_LABEL: &str = "Blog";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    File,
    Database,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::File => "file",
            Origin::Database => "database",
        }
    }
}

/// A post from either content source.
#[derive(Debug, Clone, PartialEq)]
pub enum Post {
    File(ReviewSummary),
    Database(BlogPost),
}

impl Post {
    pub fn slug(&self) -> &str {
        match self {
            Post::File(review) => &review.slug,
            Post::Database(post) => &post.slug,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Post::File(review) => &review.title,
            Post::Database(post) => &post.title,
        }
    }

    pub fn excerpt(&self) -> &str {
        match self {
            Post::File(review) => &review.excerpt,
            Post::Database(post) => &post.excerpt,
        }
    }

    pub fn cover_image(&self) -> Option<&str> {
        match self {
            Post::File(review) => review.cover_image.as_deref(),
            Post::Database(post) => post.cover_image.as_deref(),
        }
    }

    /// Category as stored by the source: a free-text label for files, a
    /// category slug for database posts.
    pub fn category(&self) -> Option<&str> {
        match self {
            Post::File(review) => review.category.as_deref(),
            Post::Database(post) => post.category.as_deref(),
        }
        .filter(|c| !c.trim().is_empty())
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        match self {
            Post::File(review) => review.date,
            Post::Database(post) => Some(post.display_date()),
        }
    }

    pub fn origin(&self) -> Origin {
        match self {
            Post::File(_) => Origin::File,
            Post::Database(_) => Origin::Database,
        }
    }

    pub fn article_type(&self) -> ArticleType {
        match self {
            Post::File(review) if review.is_review => ArticleType::Sales,
            Post::File(_) => ArticleType::Educational,
            Post::Database(post) => post.article_type,
        }
    }
}

/// A full article resolved by slug.
#[derive(Debug, Clone)]
pub enum ArticleDetail {
    File(Review),
    Database(BlogPost),
}

impl ArticleDetail {
    pub fn slug(&self) -> &str {
        match self {
            ArticleDetail::File(review) => &review.slug,
            ArticleDetail::Database(post) => &post.slug,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ArticleDetail::File(review) => &review.title,
            ArticleDetail::Database(post) => &post.title,
        }
    }

    pub fn origin(&self) -> Origin {
        match self {
            ArticleDetail::File(_) => Origin::File,
            ArticleDetail::Database(_) => Origin::Database,
        }
    }
}

/// Listing card handed to templates and the public JSON API.
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub category: String,
    pub category_slug: Option<String>,
    pub date: Option<String>,
    pub date_formatted: Option<String>,
    pub article_type: ArticleType,
    pub origin: Origin,
}

impl PostCard {
    pub fn new(post: &Post, categories: &[Category], url_prefix: &str) -> Self {
        let category_slug = super::category::post_category_slug(post);
        let category = match post {
            Post::File(_) => post.category().map(str::to_string),
            Post::Database(_) => category_slug.as_deref().map(|slug| {
                categories
                    .iter()
                    .find(|c| c.slug == slug)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| slug.to_string())
            }),
        }
        .unwrap_or_else(|| DEFAULT_CATEGORY_LABEL.to_string());

        let date = post.date();
        Self {
            slug: post.slug().to_string(),
            url: format!("{}/{}", url_prefix.trim_end_matches('/'), post.slug()),
            title: post.title().to_string(),
            excerpt: post.excerpt().to_string(),
            cover_image: post.cover_image().map(str::to_string),
            category,
            category_slug,
            date: date.map(|d| d.to_rfc3339()),
            date_formatted: date.map(|d| d.format("%d/%m/%Y").to_string()),
            article_type: post.article_type(),
            origin: post.origin(),
        }
    }
}

/// Shape of `/api/legacy-posts`: every file review, flattened, with empty
/// strings for absent fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPost {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub cover_image: String,
    pub category: String,
    pub date: String,
    pub article_type: ArticleType,
    pub is_review: bool,
    pub origin: Origin,
}

impl From<&ReviewSummary> for LegacyPost {
    fn from(review: &ReviewSummary) -> Self {
        Self {
            slug: review.slug.clone(),
            title: review.title.clone(),
            excerpt: review.excerpt.clone(),
            cover_image: review.cover_image.clone().unwrap_or_default(),
            category: review.category.clone().unwrap_or_default(),
            date: review.date.map(|d| d.to_rfc3339()).unwrap_or_default(),
            article_type: if review.is_review {
                ArticleType::Sales
            } else {
                ArticleType::Educational
            },
            is_review: review.is_review,
            origin: Origin::File,
        }
    }
}
