use crate::store::{
    Document, DocumentStore, Fields, Query, StoreError, new_document_id,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Documents persisted as `<root>/<collection>/<id>.json`.
pub struct JsonDirStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDirStore {
    pub async fn open(root: &Path) -> Result<Self, StoreError> {
        if !tokio::fs::try_exists(root).await.unwrap_or(false) {
            info!("Creating document store directory: {:?}", root);
        }
        tokio::fs::create_dir_all(root).await.map_err(|e| {
            StoreError::Unavailable(format!("cannot open {:?}: {}", root, e))
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf, StoreError> {
        validate_name(collection)?;
        Ok(self.root.join(collection))
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf, StoreError> {
        validate_name(id)?;
        Ok(self.collection_dir(collection)?.join(format!("{}.json", id)))
    }

    /// Path of a document that must already exist. An id that could never
    /// have been generated is reported as not found.
    fn existing_document_path(&self, collection: &str, id: &str) -> Result<PathBuf, StoreError> {
        let dir = self.collection_dir(collection)?;
        if validate_name(id).is_err() {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(dir.join(format!("{}.json", id)))
    }

    async fn read_document(&self, path: &Path, id: &str) -> Result<Option<Document>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let data: Fields = serde_json::from_slice(&bytes)?;
                Ok(Some(Document::new(id, data)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn write_document(&self, path: &Path, data: &Fields) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(unavailable)?;
        }
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(data)?;
        tokio::fs::write(&tmp, bytes).await.map_err(unavailable)?;
        tokio::fs::rename(&tmp, path).await.map_err(unavailable)?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidDocument(format!("invalid name: {:?}", name)))
    }
}

fn unavailable(e: std::io::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl DocumentStore for JsonDirStore {
    async fn insert(&self, collection: &str, data: Fields) -> Result<String, StoreError> {
        let id = new_document_id();
        let path = self.document_path(collection, &id)?;

        let _guard = self.write_lock.lock().await;
        self.write_document(&path, &data).await?;
        debug!("Inserted {}/{}", collection, id);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let path = match self.document_path(collection, id) {
            Ok(path) => path,
            // Ids that could never have been generated simply don't exist
            Err(StoreError::InvalidDocument(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        self.read_document(&path, id).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        let path = self.existing_document_path(collection, id)?;

        let _guard = self.write_lock.lock().await;
        let mut document = self
            .read_document(&path, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        document.data.extend(patch);
        self.write_document(&path, &document.data).await?;
        debug!("Updated {}/{}", collection, id);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let path = self.existing_document_path(collection, id)?;

        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted {}/{}", collection, id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let dir = self.collection_dir(collection)?;

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unavailable(e)),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            match self.read_document(&path, &id).await {
                Ok(Some(document)) => documents.push(document),
                Ok(None) => {}
                Err(StoreError::SerializationError(e)) => {
                    warn!("Skipping corrupt document {:?}: {}", path, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(query.apply(documents))
    }

    fn name(&self) -> &str {
        "JSON directory document store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Direction;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let id = {
            let store = JsonDirStore::open(temp_dir.path()).await.unwrap();
            store
                .insert("categories", fields(json!({"name": "Tech", "slug": "tech"})))
                .await
                .unwrap()
        };

        assert!(temp_dir.path().join("categories").join(format!("{}.json", id)).exists());

        let store = JsonDirStore::open(temp_dir.path()).await.unwrap();
        let doc = store.get("categories", &id).await.unwrap().unwrap();
        assert_eq!(doc.get("name"), Some(&json!("Tech")));
    }

    #[tokio::test]
    async fn test_merge_update_and_query() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDirStore::open(temp_dir.path()).await.unwrap();

        let a = store
            .insert("posts", fields(json!({"slug": "a", "n": 2})))
            .await
            .unwrap();
        store
            .insert("posts", fields(json!({"slug": "b", "n": 1})))
            .await
            .unwrap();

        store
            .update("posts", &a, fields(json!({"extra": true})))
            .await
            .unwrap();

        let docs = store
            .query("posts", &Query::new().order_by("n", Direction::Ascending))
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].get("slug"), Some(&json!("b")));
        assert_eq!(docs[1].get("extra"), Some(&json!(true)));
        assert_eq!(docs[1].get("n"), Some(&json!(2)));

        let by_slug = store
            .query("posts", &Query::new().where_eq("slug", "a").limit(1))
            .await
            .unwrap();
        assert_eq!(by_slug[0].id, a);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDirStore::open(temp_dir.path()).await.unwrap();
        store
            .insert("posts", fields(json!({"slug": "ok"})))
            .await
            .unwrap();
        std::fs::write(temp_dir.path().join("posts").join("broken.json"), "{not json").unwrap();

        let docs = store.query("posts", &Query::new()).await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDirStore::open(temp_dir.path()).await.unwrap();

        assert!(store.get("posts", "../secret").await.unwrap().is_none());
        assert!(store.insert("../posts", Fields::new()).await.is_err());
        assert!(matches!(
            store.delete("posts", "nope").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("posts", "../secret").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.update("posts", "a/b", Fields::new()).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
