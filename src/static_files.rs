use axum::{
    body::Body,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

/// Serves files from the static directory (stylesheets, scripts, images
/// referenced by articles).
#[derive(Clone)]
pub struct StaticFileHandler {
    pub static_dir: PathBuf,
}

impl StaticFileHandler {
    pub fn new(static_dir: PathBuf) -> Self {
        Self { static_dir }
    }

    /// Resolve a request path inside the static directory. Anything that
    /// would climb out of it resolves to `None`.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| self.static_dir.join(relative))
    }

    pub async fn serve(&self, path: &str, request_headers: &HeaderMap) -> Response {
        let Some(file_path) = self.resolve(path) else {
            error!("Path traversal attempt: {:?}", path);
            return (StatusCode::FORBIDDEN, "Forbidden").into_response();
        };

        debug!("Attempting to serve static file: {:?}", file_path);

        let metadata = match tokio::fs::metadata(&file_path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return (StatusCode::NOT_FOUND, "File not found").into_response(),
            Err(e) => {
                debug!("Failed to get metadata for {:?}: {}", file_path, e);
                return (StatusCode::NOT_FOUND, "File not found").into_response();
            }
        };

        let modified = metadata.modified().ok();
        let etag = modified
            .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
            .map(|d| format!("\"{}-{}\"", d.as_secs(), metadata.len()));

        if let Some(etag) = &etag
            && request_headers
                .get(header::IF_NONE_MATCH)
                .and_then(|v| v.to_str().ok())
                == Some(etag.as_str())
        {
            return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag.clone())]).into_response();
        }

        let file = match File::open(&file_path).await {
            Ok(file) => file,
            Err(e) => {
                debug!("Failed to open file {:?}: {}", file_path, e);
                return (StatusCode::NOT_FOUND, "File not found").into_response();
            }
        };

        let content_type = mime_guess::from_path(&file_path)
            .first_or_octet_stream()
            .to_string();

        let cache_control = if content_type.starts_with("image/") {
            "public, max-age=31536000"
        } else if content_type.starts_with("text/css")
            || content_type.starts_with("application/javascript")
            || content_type.starts_with("text/javascript")
        {
            "public, max-age=300, must-revalidate"
        } else {
            "public, max-age=3600"
        };

        let mut response = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, cache_control);

        if let Some(modified) = modified {
            response = response.header(header::LAST_MODIFIED, httpdate::fmt_http_date(modified));
        }
        if let Some(etag) = etag {
            response = response.header(header::ETAG, etag);
        }

        let body = Body::from_stream(ReaderStream::new(file));
        response.body(body).unwrap_or_else(|e| {
            error!("Failed to build static response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_rejects_traversal() {
        let handler = StaticFileHandler::new(PathBuf::from("/srv/static"));
        assert_eq!(
            handler.resolve("css/site.css"),
            Some(PathBuf::from("/srv/static/css/site.css"))
        );
        assert_eq!(handler.resolve("../secret"), None);
        assert_eq!(handler.resolve("css/../../secret"), None);
    }

    #[tokio::test]
    async fn test_serve_sets_headers_and_honors_etag() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("site.css"), "body{}").unwrap();
        let handler = StaticFileHandler::new(temp_dir.path().to_path_buf());

        let response = handler.serve("site.css", &HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
        let etag = response.headers()[header::ETAG].clone();

        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, etag);
        let response = handler.serve("site.css", &headers).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

        let response = handler.serve("missing.css", &HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
