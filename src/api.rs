use crate::AppState;
use crate::feed::{LegacyPost, PostCard, post_category_slug};
use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub category: Option<String>,
    pub limit: Option<usize>,
}

/// `GET /api/posts`: the merged public listing as JSON cards.
pub async fn posts_handler(
    State(app_state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Json<Vec<PostCard>> {
    let (posts, categories) = tokio::join!(app_state.feed.home(), app_state.feed.categories());
    let url_prefix = &app_state.config.reviews.url_prefix;

    let cards = posts
        .iter()
        .filter(|post| match query.category.as_deref() {
            Some(slug) => post_category_slug(post).as_deref() == Some(slug),
            None => true,
        })
        .take(query.limit.unwrap_or(usize::MAX))
        .map(|post| PostCard::new(post, &categories, url_prefix))
        .collect();

    Json(cards)
}

/// `GET /api/legacy-posts`: every file review in its flat legacy shape.
pub async fn legacy_posts_handler(State(app_state): State<AppState>) -> Json<Vec<LegacyPost>> {
    let reviews = app_state.reviews.list_reviews().await;
    Json(reviews.iter().map(LegacyPost::from).collect())
}
