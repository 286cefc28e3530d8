pub mod meta;
pub mod score;

pub use meta::PageMeta;
pub use score::{CheckId, CheckStatus, SeoCheck, SeoInput, SeoReport, score};
