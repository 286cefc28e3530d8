use crate::store::{
    Document, DocumentStore, Fields, Query, StoreError, new_document_id,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, data: Fields) -> Result<String, StoreError> {
        let id = new_document_id();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        debug!("Inserted {}/{} in memory", collection, id);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let data = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        data.extend(patch);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .into_iter()
            .flat_map(|docs| docs.iter())
            .map(|(id, data)| Document::new(id.clone(), data.clone()));
        Ok(query.apply(documents))
    }

    fn name(&self) -> &str {
        "In-memory document store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Direction;
    use serde_json::{Value, json};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let store = MemoryStore::new();
        let id = store
            .insert("posts", fields(json!({"title": "Olá", "slug": "ola"})))
            .await
            .unwrap();

        let doc = store.get("posts", &id).await.unwrap().unwrap();
        assert_eq!(doc.get("title"), Some(&json!("Olá")));

        store
            .update("posts", &id, fields(json!({"title": "Oi"})))
            .await
            .unwrap();
        let doc = store.get("posts", &id).await.unwrap().unwrap();
        assert_eq!(doc.get("title"), Some(&json!("Oi")));
        assert_eq!(doc.get("slug"), Some(&json!("ola")));

        store.delete("posts", &id).await.unwrap();
        assert!(store.get("posts", &id).await.unwrap().is_none());
        assert!(matches!(
            store.delete("posts", &id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_query_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        let docs = store
            .query("nothing", &Query::new().order_by("name", Direction::Ascending))
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = MemoryStore::new();
        let result = store.update("posts", "missing", Fields::new()).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
