use crate::AppState;
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Handler for /robots.txt
/// Serves `robots.txt` from the static directory when present, otherwise a
/// default that keeps crawlers out of the admin area and points at the sitemap.
pub async fn robots_txt_handler(State(app_state): State<AppState>) -> Response {
    let custom_robots_path = app_state.config.static_files.directory.join("robots.txt");

    if custom_robots_path.exists() {
        match tokio::fs::read_to_string(&custom_robots_path).await {
            Ok(content) => {
                return (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    content,
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!("Failed to read custom robots.txt: {}", e);
            }
        }
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        default_robots(app_state.base_url()),
    )
        .into_response()
}

pub fn default_robots(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /admin\nDisallow: /api/admin\n\nSitemap: {}/sitemap.xml\n",
        base_url.trim_end_matches('/')
    )
}
