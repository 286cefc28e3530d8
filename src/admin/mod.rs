pub mod error;
pub mod handlers;
pub mod images;
pub mod session;

pub use error::AdminError;
pub use session::{AdminSession, hash_password};

use crate::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: String,
    /// Hex SHA-256 of the admin password (`vitrine hash-password`).
    pub password_sha256: String,
    pub session_hours: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password_sha256: String::new(),
            session_hours: 24 * 7,
        }
    }
}

/// Sign-in endpoints and the JSON API used by the post editor.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(handlers::login))
        .route("/admin/logout", post(handlers::logout))
        .route("/api/admin/me", get(handlers::me))
        .route(
            "/api/admin/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/admin/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route(
            "/api/admin/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/admin/categories/{id}",
            axum::routing::put(handlers::update_category).delete(handlers::delete_category),
        )
        .route("/api/admin/seo/score", post(handlers::score_seo))
        .route("/api/admin/reviews/refresh", post(handlers::refresh_reviews))
        .route("/api/admin/images", get(images::images_handler))
}
