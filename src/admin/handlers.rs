use super::{
    AdminError,
    session::{
        AdminSession, clear_session_cookie, issue_session, password_matches, session_cookie,
    },
};
use crate::AppState;
use crate::blog::{BlogPost, Category, CategoryDraft, PostDraft, PostPatch};
use crate::seo::{self, SeoInput, SeoReport};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub email: String,
}

/// A saved post together with its advisory SEO report.
#[derive(Debug, Serialize)]
pub struct SavedPost {
    pub post: BlogPost,
    pub seo: SeoReport,
}

impl From<BlogPost> for SavedPost {
    fn from(post: BlogPost) -> Self {
        let seo = seo::score(&SeoInput::from(&post));
        Self { post, seo }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub reviews: usize,
}

fn set_cookie(cookie: String) -> Result<HeaderMap, AdminError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|e| AdminError::Internal(format!("invalid cookie header: {}", e)))?,
    );
    Ok(headers)
}

pub async fn login(
    State(app_state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AdminError> {
    let admin = &app_state.config.admin;
    let email = request.email.trim().to_lowercase();

    if email != admin.email.trim().to_lowercase()
        || !password_matches(&request.password, &admin.password_sha256)
    {
        warn!("Failed admin login for {}", email);
        return Err(AdminError::InvalidCredentials);
    }

    let session = issue_session(
        &app_state.config.app.session_secret,
        &email,
        admin.session_hours,
    )
    .map_err(AdminError::Internal)?;
    let headers = set_cookie(session_cookie(&session, admin.session_hours))?;

    info!("Admin {} signed in", email);
    Ok((headers, Json(CurrentUser { email })))
}

pub async fn logout() -> Result<impl IntoResponse, AdminError> {
    let headers = set_cookie(clear_session_cookie())?;
    Ok((headers, StatusCode::NO_CONTENT))
}

pub async fn me(session: AdminSession) -> Json<CurrentUser> {
    Json(CurrentUser {
        email: session.email,
    })
}

pub async fn list_posts(
    _session: AdminSession,
    State(app_state): State<AppState>,
) -> Json<Vec<BlogPost>> {
    Json(app_state.posts.get_posts(false).await)
}

pub async fn get_post(
    _session: AdminSession,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SavedPost>, AdminError> {
    app_state
        .posts
        .get_post_by_id(&id)
        .await
        .map(|post| Json(post.into()))
        .ok_or_else(|| crate::blog::BlogError::NotFound(format!("post {}", id)).into())
}

pub async fn create_post(
    session: AdminSession,
    State(app_state): State<AppState>,
    Json(draft): Json<PostDraft>,
) -> Result<impl IntoResponse, AdminError> {
    let post = app_state.posts.create_post(draft).await?;
    info!("{} created post {}", session.email, post.slug);
    Ok((StatusCode::CREATED, Json(SavedPost::from(post))))
}

pub async fn update_post(
    session: AdminSession,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<PostPatch>,
) -> Result<Json<SavedPost>, AdminError> {
    let post = app_state.posts.update_post(&id, patch).await?;
    info!("{} updated post {}", session.email, post.slug);
    Ok(Json(post.into()))
}

pub async fn delete_post(
    session: AdminSession,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AdminError> {
    app_state.posts.delete_post(&id).await?;
    info!("{} deleted post {}", session.email, id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(
    _session: AdminSession,
    State(app_state): State<AppState>,
) -> Json<Vec<Category>> {
    Json(app_state.posts.get_categories().await)
}

pub async fn create_category(
    _session: AdminSession,
    State(app_state): State<AppState>,
    Json(draft): Json<CategoryDraft>,
) -> Result<impl IntoResponse, AdminError> {
    let category = app_state.posts.create_category(draft).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    _session: AdminSession,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<CategoryDraft>,
) -> Result<Json<Category>, AdminError> {
    Ok(Json(app_state.posts.update_category(&id, draft).await?))
}

pub async fn delete_category(
    _session: AdminSession,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AdminError> {
    app_state.posts.delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Score the editor's unsaved fields.
pub async fn score_seo(_session: AdminSession, Json(input): Json<SeoInput>) -> Json<SeoReport> {
    Json(seo::score(&input))
}

pub async fn refresh_reviews(
    session: AdminSession,
    State(app_state): State<AppState>,
) -> Result<Json<RefreshResponse>, AdminError> {
    let reviews = app_state.reviews.refresh_reviews().await?;
    info!("{} refreshed reviews ({} found)", session.email, reviews);
    Ok(Json(RefreshResponse { reviews }))
}
