use crate::blog::{BlogError, ValidationError};
use crate::reviews::ReviewsError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Not signed in")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Blog(#[from] BlogError),

    #[error("Failed to refresh reviews: {0}")]
    Reviews(#[from] ReviewsError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [ValidationError]>,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::Unauthorized | AdminError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AdminError::Blog(BlogError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::Blog(BlogError::NotFound(_)) => StatusCode::NOT_FOUND,
            AdminError::Blog(BlogError::SlugTaken(_)) => StatusCode::CONFLICT,
            AdminError::Blog(_) | AdminError::Reviews(_) | AdminError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!("Admin request failed: {}", self);
        } else {
            warn!("Admin request rejected: {}", self);
        }

        let fields = match &self {
            AdminError::Blog(BlogError::Validation(errors)) => Some(errors.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            fields,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AdminError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                AdminError::Blog(BlogError::Validation(vec![ValidationError::MissingTitle])),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AdminError::Blog(BlogError::SlugTaken("x".into())),
                StatusCode::CONFLICT,
            ),
            (
                AdminError::Blog(BlogError::NotFound("post 1".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AdminError::Blog(BlogError::Store(StoreError::Unavailable("down".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
