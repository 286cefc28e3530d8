pub mod error;
pub mod repository;
pub mod types;

pub use error::{BlogError, ValidationError};
pub use repository::{CATEGORIES_COLLECTION, POSTS_COLLECTION, PostRepository};
pub use types::*;
