use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod admin;
pub mod api;
pub mod blog;
pub mod feed;
pub mod reviews;
pub mod robots;
pub mod seo;
pub mod sitemap;
pub mod slug;
pub mod startup_checks;
pub mod static_files;
pub mod store;
pub mod templating;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub templates: TemplateConfig,
    pub static_files: StaticConfig,
    #[serde(default)]
    pub reviews: reviews::ReviewsConfig,
    #[serde(default)]
    pub feed: feed::FeedConfig,
    #[serde(default)]
    pub database: store::StoreConfig,
    #[serde(default)]
    pub admin: admin::AdminConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub log_level: String,
    /// Key used to sign admin session cookies.
    pub session_secret: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateConfig {
    pub directory: PathBuf,
    #[serde(default = "default_index_template")]
    pub index_template: String,
    #[serde(default = "default_category_template")]
    pub category_template: String,
    #[serde(default = "default_article_template")]
    pub article_template: String,
}

fn default_index_template() -> String {
    "pages/index.html.liquid".to_string()
}

fn default_category_template() -> String {
    "pages/category.html.liquid".to_string()
}

fn default_article_template() -> String {
    "pages/article.html.liquid".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticConfig {
    pub directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            app: AppConfig {
                name: "Vitrine".to_string(),
                description: String::new(),
                log_level: "info".to_string(),
                session_secret: "change-me-in-production".to_string(),
                base_url: None,
            },
            templates: TemplateConfig {
                directory: PathBuf::from("templates"),
                index_template: default_index_template(),
                category_template: default_category_template(),
                article_template: default_article_template(),
            },
            static_files: StaticConfig {
                directory: PathBuf::from("static"),
            },
            reviews: reviews::ReviewsConfig::default(),
            feed: feed::FeedConfig::default(),
            database: store::StoreConfig::default(),
            admin: admin::AdminConfig::default(),
        }
    }
}

use axum::{
    Router,
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub template_engine: Arc<templating::TemplateEngine>,
    pub static_handler: static_files::StaticFileHandler,
    pub posts: blog::PostRepository,
    pub reviews: Arc<reviews::ReviewsLibrary>,
    pub feed: feed::Feed,
    pub config: Config,
}

impl AppState {
    /// Wire every service around an already opened document store and load
    /// the review files once.
    pub async fn new(config: Config, store: store::DynDocumentStore) -> Self {
        let template_engine = Arc::new(templating::TemplateEngine::new(
            config.templates.directory.clone(),
        ));
        let static_handler =
            static_files::StaticFileHandler::new(config.static_files.directory.clone());

        let posts = blog::PostRepository::new(store);
        let reviews = Arc::new(reviews::ReviewsLibrary::new(config.reviews.clone()));
        if let Err(e) = reviews.refresh_reviews().await {
            error!("Failed to load reviews: {}", e);
        }
        let feed = feed::Feed::new(posts.clone(), reviews.clone(), &config.feed);

        Self {
            template_engine,
            static_handler,
            posts,
            reviews,
            feed,
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        self.config
            .app
            .base_url
            .as_deref()
            .unwrap_or("http://localhost:3000")
            .trim_end_matches('/')
    }
}

async fn static_file_handler(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    app_state.static_handler.serve(&path, &headers).await
}

pub fn create_app(app_state: AppState) -> Router {
    let article_route = format!(
        "{}/{{slug}}",
        app_state.config.reviews.url_prefix.trim_end_matches('/')
    );

    Router::new()
        .route("/", get(feed::handlers::home_handler))
        .route("/categories/{slug}", get(feed::handlers::category_handler))
        .route(&article_route, get(feed::handlers::article_handler))
        .route("/api/posts", get(api::posts_handler))
        .route("/api/legacy-posts", get(api::legacy_posts_handler))
        .route("/sitemap.xml", get(sitemap::sitemap_handler))
        .route("/robots.txt", get(robots::robots_txt_handler))
        .route("/static/{*path}", get(static_file_handler))
        .merge(admin::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let headers = request.headers();
                    let user_agent = headers
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");
                    let referer = headers
                        .get("referer")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %request.method(),
                        path = %request.uri().path(),
                        query = ?request.uri().query(),
                        user_agent = %user_agent,
                        referer = %referer,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let size = response
                            .headers()
                            .get("content-length")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("-");

                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            size = %size,
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state)
}
