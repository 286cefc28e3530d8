use super::{
    error::BlogError,
    types::{BlogPost, Category, CategoryDraft, PostDraft, PostPatch, PostStatus},
};
use crate::store::{Direction, Document, DynDocumentStore, Fields, Query, StoreError};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{error, info, warn};

pub const POSTS_COLLECTION: &str = "posts";
pub const CATEGORIES_COLLECTION: &str = "categories";

/// Posts and categories held in the document database.
///
/// Read operations never fail: an unreachable store is logged and reads as
/// empty so public pages keep rendering file-based content. Writes come from
/// an operator and report their errors.
#[derive(Clone)]
pub struct PostRepository {
    store: DynDocumentStore,
}

impl PostRepository {
    pub fn new(store: DynDocumentStore) -> Self {
        Self { store }
    }

    pub async fn get_posts(&self, published_only: bool) -> Vec<BlogPost> {
        let mut query = Query::new().order_by("created_at", Direction::Descending);
        if published_only {
            query = query.where_eq("status", "published");
        }

        match self.store.query(POSTS_COLLECTION, &query).await {
            Ok(documents) => decode_all(documents),
            Err(e) => {
                error!("Failed to fetch posts from {}: {}", self.store.name(), e);
                Vec::new()
            }
        }
    }

    pub async fn get_post_by_id(&self, id: &str) -> Option<BlogPost> {
        match self.store.get(POSTS_COLLECTION, id).await {
            Ok(document) => document.and_then(decode_logged),
            Err(e) => {
                error!("Failed to fetch post {}: {}", id, e);
                None
            }
        }
    }

    pub async fn get_post_by_slug(&self, slug: &str, published_only: bool) -> Option<BlogPost> {
        let mut query = Query::new().where_eq("slug", slug).limit(1);
        if published_only {
            query = query.where_eq("status", "published");
        }

        match self.store.query(POSTS_COLLECTION, &query).await {
            Ok(documents) => documents.into_iter().next().and_then(decode_logged),
            Err(e) => {
                error!("Failed to fetch post by slug {}: {}", slug, e);
                None
            }
        }
    }

    pub async fn create_post(&self, mut draft: PostDraft) -> Result<BlogPost, BlogError> {
        draft.normalize();
        draft.validate().map_err(BlogError::Validation)?;
        self.ensure_slug_available(POSTS_COLLECTION, &draft.slug, None)
            .await?;

        let now = Utc::now();
        let mut post = BlogPost {
            id: String::new(),
            title: draft.title,
            slug: draft.slug,
            content: draft.content,
            excerpt: draft.excerpt,
            cover_image: draft.cover_image,
            category: draft.category,
            status: draft.status,
            article_type: draft.article_type,
            author: draft.author,
            seo: draft.seo,
            product: draft.product,
            blocks: draft.blocks,
            created_at: now,
            updated_at: now,
            published_at: (draft.status == PostStatus::Published).then_some(now),
        };

        post.id = self
            .store
            .insert(POSTS_COLLECTION, encode(&post)?)
            .await?;
        info!("Created post {} ({})", post.slug, post.id);
        Ok(post)
    }

    pub async fn update_post(&self, id: &str, mut patch: PostPatch) -> Result<BlogPost, BlogError> {
        let cleared = patch.normalize();
        patch.validate().map_err(BlogError::Validation)?;

        let current = self
            .store
            .get(POSTS_COLLECTION, id)
            .await?
            .ok_or_else(|| BlogError::NotFound(format!("post {}", id)))?;
        let current: BlogPost = decode(current)?;

        if let Some(slug) = &patch.slug
            && slug != &current.slug
        {
            self.ensure_slug_available(POSTS_COLLECTION, slug, Some(id))
                .await?;
        }

        let now = Utc::now();
        let mut fields = encode(&patch)?;
        for key in cleared {
            fields.insert(key.to_string(), Value::Null);
        }
        fields.insert("updated_at".to_string(), serde_json::to_value(now)?);
        if patch.status == Some(PostStatus::Published) && current.published_at.is_none() {
            fields.insert("published_at".to_string(), serde_json::to_value(now)?);
        }

        self.store
            .update(POSTS_COLLECTION, id, fields)
            .await
            .map_err(|e| not_found_as(e, "post", id))?;
        info!("Updated post {}", id);

        self.store
            .get(POSTS_COLLECTION, id)
            .await?
            .ok_or_else(|| BlogError::NotFound(format!("post {}", id)))
            .and_then(decode)
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), BlogError> {
        self.store
            .delete(POSTS_COLLECTION, id)
            .await
            .map_err(|e| not_found_as(e, "post", id))?;
        info!("Deleted post {}", id);
        Ok(())
    }

    pub async fn get_categories(&self) -> Vec<Category> {
        let query = Query::new().order_by("name", Direction::Ascending);
        match self.store.query(CATEGORIES_COLLECTION, &query).await {
            Ok(documents) => decode_all(documents),
            Err(e) => {
                error!("Failed to fetch categories from {}: {}", self.store.name(), e);
                Vec::new()
            }
        }
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Option<Category> {
        let query = Query::new().where_eq("slug", slug).limit(1);
        match self.store.query(CATEGORIES_COLLECTION, &query).await {
            Ok(documents) => documents.into_iter().next().and_then(decode_logged),
            Err(e) => {
                error!("Failed to fetch category {}: {}", slug, e);
                None
            }
        }
    }

    pub async fn create_category(&self, draft: CategoryDraft) -> Result<Category, BlogError> {
        let slug = draft.resolve_slug().map_err(BlogError::Validation)?;
        self.ensure_slug_available(CATEGORIES_COLLECTION, &slug, None)
            .await?;

        let mut category = Category {
            id: String::new(),
            name: draft.name.trim().to_string(),
            slug,
            description: draft.description.filter(|d| !d.trim().is_empty()),
        };
        category.id = self
            .store
            .insert(CATEGORIES_COLLECTION, encode(&category)?)
            .await?;
        info!("Created category {} ({})", category.slug, category.id);
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: &str,
        draft: CategoryDraft,
    ) -> Result<Category, BlogError> {
        let slug = draft.resolve_slug().map_err(BlogError::Validation)?;
        self.ensure_slug_available(CATEGORIES_COLLECTION, &slug, Some(id))
            .await?;

        let category = Category {
            id: id.to_string(),
            name: draft.name.trim().to_string(),
            slug,
            description: draft.description.filter(|d| !d.trim().is_empty()),
        };
        self.store
            .update(CATEGORIES_COLLECTION, id, encode(&category)?)
            .await
            .map_err(|e| not_found_as(e, "category", id))?;
        info!("Updated category {}", id);
        Ok(category)
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), BlogError> {
        self.store
            .delete(CATEGORIES_COLLECTION, id)
            .await
            .map_err(|e| not_found_as(e, "category", id))?;
        info!("Deleted category {}", id);
        Ok(())
    }

    async fn ensure_slug_available(
        &self,
        collection: &str,
        slug: &str,
        owner: Option<&str>,
    ) -> Result<(), BlogError> {
        let query = Query::new().where_eq("slug", slug);
        let taken = self
            .store
            .query(collection, &query)
            .await?
            .iter()
            .any(|doc| Some(doc.id.as_str()) != owner);

        if taken {
            Err(BlogError::SlugTaken(slug.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Serialize a record into stored fields. The id lives in the document key,
/// never in its body.
fn encode<T: Serialize>(value: &T) -> Result<Fields, BlogError> {
    match serde_json::to_value(value)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        other => Err(BlogError::Store(StoreError::InvalidDocument(format!(
            "expected an object, got {}",
            other
        )))),
    }
}

fn decode<T: DeserializeOwned>(document: Document) -> Result<T, BlogError> {
    let mut fields = document.data;
    fields.insert("id".to_string(), Value::String(document.id));
    Ok(serde_json::from_value(Value::Object(fields))?)
}

fn decode_logged<T: DeserializeOwned>(document: Document) -> Option<T> {
    let id = document.id.clone();
    match decode(document) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Skipping malformed document {}: {}", id, e);
            None
        }
    }
}

fn decode_all<T: DeserializeOwned>(documents: Vec<Document>) -> Vec<T> {
    documents.into_iter().filter_map(decode_logged).collect()
}

fn not_found_as(error: StoreError, kind: &str, id: &str) -> BlogError {
    match error {
        StoreError::NotFound { .. } => BlogError::NotFound(format!("{} {}", kind, id)),
        other => BlogError::Store(other),
    }
}
