use super::error::ValidationError;
use crate::slug::{is_slug, slugify};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleType {
    #[default]
    Educational,
    Sales,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoFields {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub focus_keyword: Option<String>,
    pub canonical_url: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductInfo {
    pub name: String,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub affiliate_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionedImage {
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionRating {
    pub criterion: String,
    pub score: f64,
}

/// Structured content rendered around the body of a review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewBlocks {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub faq: Vec<FaqEntry>,
    pub images: Vec<CaptionedImage>,
    pub ratings: Vec<CriterionRating>,
    pub verdict: Option<String>,
}

/// A post stored in the document database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Slug of the [`Category`] this post belongs to.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub article_type: ArticleType,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub seo: SeoFields,
    #[serde(default)]
    pub product: Option<ProductInfo>,
    #[serde(default)]
    pub blocks: ReviewBlocks,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl BlogPost {
    /// Date shown to readers: first publication, falling back to creation.
    pub fn display_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }
}

/// Editor form contents for a new post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub status: PostStatus,
    pub article_type: ArticleType,
    pub author: Option<String>,
    pub seo: SeoFields,
    pub product: Option<ProductInfo>,
    pub blocks: ReviewBlocks,
}

impl PostDraft {
    /// Fill in what the editor derives on its own: a slug from the title
    /// when none was typed, and empty optional strings treated as unset.
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.slug = self.slug.trim().to_string();
        if self.slug.is_empty() {
            self.slug = slugify(&self.title);
        }
        self.cover_image = non_empty(self.cover_image.take());
        self.category = category_slug(self.category.take());
        self.author = non_empty(self.author.take());
    }

    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(ValidationError::MissingTitle);
        }
        check_slug(&self.slug, &mut errors);
        if let Some(product) = &self.product {
            check_rating(product.rating, &mut errors);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Partial update: only the fields that are present are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_type: Option<ArticleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<ReviewBlocks>,
}

impl PostPatch {
    /// Trim the text fields and store the category as a slug. Returns the
    /// optional fields the patch blanks out; the update writes those as
    /// unset instead of keeping the stored value.
    pub fn normalize(&mut self) -> Vec<&'static str> {
        if let Some(title) = self.title.as_mut() {
            *title = title.trim().to_string();
        }
        if let Some(slug) = self.slug.as_mut() {
            *slug = slug.trim().to_string();
        }

        let mut cleared = Vec::new();
        if let Some(cover_image) = self.cover_image.take() {
            self.cover_image = non_empty(Some(cover_image));
            if self.cover_image.is_none() {
                cleared.push("cover_image");
            }
        }
        if let Some(category) = self.category.take() {
            self.category = category_slug(Some(category));
            if self.category.is_none() {
                cleared.push("category");
            }
        }
        if let Some(author) = self.author.take() {
            self.author = non_empty(Some(author));
            if self.author.is_none() {
                cleared.push("author");
            }
        }
        cleared
    }

    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.push(ValidationError::MissingTitle);
        }
        if let Some(slug) = &self.slug {
            check_slug(slug, &mut errors);
        }
        if let Some(product) = &self.product {
            check_rating(product.rating, &mut errors);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl CategoryDraft {
    /// Resolve the stored slug (explicit or derived from the name) after
    /// checking the draft.
    pub fn resolve_slug(&self) -> Result<String, Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(ValidationError::MissingCategoryName);
        }

        let slug = match self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => explicit.to_string(),
            None => slugify(&self.name),
        };
        if errors.is_empty() {
            check_slug(&slug, &mut errors);
        }

        if errors.is_empty() { Ok(slug) } else { Err(errors) }
    }
}

fn check_slug(slug: &str, errors: &mut Vec<ValidationError>) {
    if slug.trim().is_empty() {
        errors.push(ValidationError::MissingSlug);
    } else if !is_slug(slug) {
        errors.push(ValidationError::InvalidSlug(slug.to_string()));
    }
}

fn check_rating(rating: Option<f64>, errors: &mut Vec<ValidationError>) {
    if let Some(rating) = rating
        && !(0.0..=5.0).contains(&rating)
    {
        errors.push(ValidationError::RatingOutOfRange(rating.to_string()));
    }
}

/// Categories are referenced by slug; a typed label is slugified.
fn category_slug(value: Option<String>) -> Option<String> {
    value.map(|c| slugify(&c)).filter(|c| !c.is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
