use super::types::Post;
use crate::blog::BlogPost;
use crate::reviews::ReviewSummary;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How merged listings are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedOrder {
    /// Database posts in their stored order, then file posts in theirs.
    #[default]
    Origin,
    /// Newest display date first; undated posts go last.
    Newest,
}

/// Combine both sources into one listing.
///
/// Database posts come first. A slug appears at most once: when both
/// sources carry it the database entry is kept, and within one source the
/// first occurrence wins.
pub fn merge(database: Vec<BlogPost>, files: Vec<ReviewSummary>) -> Vec<Post> {
    let mut seen = HashSet::new();

    database
        .into_iter()
        .map(Post::Database)
        .chain(files.into_iter().map(Post::File))
        .filter(|post| seen.insert(post.slug().to_string()))
        .collect()
}

pub fn merge_ordered(
    database: Vec<BlogPost>,
    files: Vec<ReviewSummary>,
    order: FeedOrder,
) -> Vec<Post> {
    let mut posts = merge(database, files);
    if order == FeedOrder::Newest {
        // Stable: ties keep database-first order
        posts.sort_by(|a, b| b.date().cmp(&a.date()));
    }
    posts
}
