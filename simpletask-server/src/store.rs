//! In-memory document store backing the HTTP API.
//!
//! The [`DocumentStore`] holds free-form JSON documents grouped into
//! named collections. Ids are assigned on insert (UUID v7), so listings
//! cluster by creation time and stay stable across reads. Updates merge
//! field by field, with JSON `null` removing a field.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use simpletask_core::task::{Document, Fields};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Thread-safe collection-of-documents store.
///
/// Collections spring into existence on first insert; reading an unknown
/// collection behaves like an empty one.
#[derive(Debug, Default)]
pub struct DocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl DocumentStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document with a store-assigned id, returning the id.
    pub async fn insert(&self, collection: &str, fields: Fields) -> String {
        let id = Uuid::now_v7().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        drop(collections);
        id
    }

    /// Puts a document under a chosen id, replacing any existing one.
    ///
    /// Exists for documents whose id is meaningful, like profile
    /// documents keyed by user id, and for seeding test state.
    pub async fn upsert(&self, collection: &str, id: &str, fields: Fields) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Returns all documents whose `field` holds the string `value`, in
    /// id order.
    pub async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Vec<Document> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Vec::new();
        };
        documents
            .iter()
            .filter(|(_, fields)| fields.get(field).and_then(Value::as_str) == Some(value))
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect()
    }

    /// Returns the document with the given id, if present.
    pub async fn fetch(&self, collection: &str, id: &str) -> Option<Document> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            })
    }

    /// Merges `fields` into an existing document. A `null` value removes
    /// the field. Returns `false` if the document does not exist.
    pub async fn update(&self, collection: &str, id: &str, fields: Fields) -> bool {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
        else {
            return false;
        };
        for (key, value) in fields {
            if value.is_null() {
                document.remove(&key);
            } else {
                document.insert(key, value);
            }
        }
        true
    }

    /// Removes the document with the given id. Returns `false` if it did
    /// not exist.
    pub async fn delete(&self, collection: &str, id: &str) -> bool {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
            .is_some()
    }
}
