//! In-memory document store.
//!
//! Backs the [`RemoteStore`] trait with in-process maps for tests and
//! offline use. Observable behavior matches [`super::http::HttpStore`]
//! point for point: store-assigned UUID v7 ids, merge updates where null
//! removes a field, and `NotFound` on missing ids, so code exercised
//! against one backend behaves the same against the other.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use simpletask_core::task::{Document, Fields};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RemoteStore, StoreError};

/// In-process store holding one document map per collection.
///
/// Documents list in id order. Ids are UUID v7, so listings cluster by
/// creation time and stay stable across reads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a document under a chosen id, replacing any existing one.
    ///
    /// Regular inserts assign ids; this exists for documents whose id is
    /// meaningful, like profile documents keyed by owner id, and for
    /// seeding fixtures.
    pub async fn put(&self, collection: &str, id: &str, fields: Fields) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }
}

impl RemoteStore for MemoryStore {
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::now_v7().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(documents
            .iter()
            .filter(|(_, fields)| fields.get(field).and_then(Value::as_str) == Some(value))
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn fetch_by_id(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            })
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        for (key, value) in fields {
            if value.is_null() {
                document.remove(&key);
            } else {
                document.insert(key, value);
            }
        }
        Ok(())
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }
}
