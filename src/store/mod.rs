pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Collection-scoped document database. Implementations hold their own
/// connection state; callers receive it as an injected [`DynDocumentStore`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document and return its generated id.
    async fn insert(&self, collection: &str, data: Fields) -> Result<String, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Merge `patch` into the stored fields. Keys absent from the patch keep
    /// their current values.
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    fn name(&self) -> &str;
}

pub type DynDocumentStore = Arc<dyn DocumentStore>;

pub async fn create_store(config: &StoreConfig) -> Result<DynDocumentStore, StoreError> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(providers::memory::MemoryStore::new())),
        StoreConfig::JsonDir(dir_config) => Ok(Arc::new(
            providers::json_dir::JsonDirStore::open(&dir_config.directory).await?,
        )),
    }
}

pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
