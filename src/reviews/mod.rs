pub mod core;
pub mod error;
pub mod types;

pub use core::ReviewsLibrary;
pub use error::ReviewsError;
pub use types::{FrontMatter, Review, ReviewSummary, ReviewsConfig};
