use super::AdminSession;
use crate::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Directory under the static root holding images referenced by reviews.
pub const REVIEW_IMAGES_DIR: &str = "images/reviews";

/// An uploaded review image and the Markdown that embeds it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewImage {
    pub file: String,
    pub url: String,
    pub snippet: String,
}

/// Every visible file in `dir`, sorted by name. A missing directory is an
/// empty gallery.
pub async fn list_review_images(dir: &Path) -> Vec<ReviewImage> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No review images at {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read review images in {:?}: {}", dir, e);
                break;
            }
        };
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if is_file && !name.starts_with('.') {
            files.push(name);
        }
    }
    files.sort();

    files
        .into_iter()
        .map(|file| {
            let url = format!("/static/{}/{}", REVIEW_IMAGES_DIR, urlencoding::encode(&file));
            let snippet = format!("![Descrição da imagem]({})", url);
            ReviewImage { file, url, snippet }
        })
        .collect()
}

/// `GET /api/admin/images`: the review image gallery.
pub async fn images_handler(
    _session: AdminSession,
    State(app_state): State<AppState>,
) -> Json<Vec<ReviewImage>> {
    let dir = app_state
        .config
        .static_files
        .directory
        .join(REVIEW_IMAGES_DIR);
    Json(list_review_images(&dir).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lists_visible_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("b-fone.webp"), b"").unwrap();
        fs::write(dir.join("air fryer.jpg"), b"").unwrap();
        fs::write(dir.join(".DS_Store"), b"").unwrap();
        fs::create_dir(dir.join("rascunhos")).unwrap();

        let images = list_review_images(dir).await;
        let files: Vec<&str> = images.iter().map(|i| i.file.as_str()).collect();
        assert_eq!(files, vec!["air fryer.jpg", "b-fone.webp"]);
        assert_eq!(images[0].url, "/static/images/reviews/air%20fryer.jpg");
        assert_eq!(
            images[0].snippet,
            "![Descrição da imagem](/static/images/reviews/air%20fryer.jpg)"
        );
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(
            list_review_images(&temp_dir.path().join("nope"))
                .await
                .is_empty()
        );
    }
}
