use crate::store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Editor input problems, reported before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "field", content = "detail", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,

    #[error("slug is required")]
    MissingSlug,

    #[error("slug {0:?} is not URL-safe (lowercase letters, digits and hyphens only)")]
    InvalidSlug(String),

    #[error("category name is required")]
    MissingCategoryName,

    #[error("rating {0} must be between 0 and 5")]
    RatingOutOfRange(String),
}

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation(Vec<ValidationError>),

    #[error("{0} not found")]
    NotFound(String),

    #[error("slug {0:?} is already used by another entry")]
    SlugTaken(String),

    #[error("Malformed stored document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
