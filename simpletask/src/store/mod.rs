//! Remote document store abstraction for `SimpleTask`.
//!
//! Defines the [`RemoteStore`] trait that all store backends must satisfy.
//! Concrete implementations include:
//! - [`memory::MemoryStore`] — in-process store for tests and offline use
//! - [`http::HttpStore`] — client for the JSON document store API

pub mod http;
pub mod memory;

use simpletask_core::task::{Document, Fields};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No document with the given id exists in the collection.
    #[error("document {id} not found in collection {collection}")]
    NotFound {
        /// Collection that was addressed.
        collection: String,
        /// Document id that was addressed.
        id: String,
    },

    /// The store could not be reached at all.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// The store answered, but with a body that could not be understood.
    #[error("invalid store response: {0}")]
    InvalidResponse(String),

    /// The store refused the request.
    #[error("store rejected request with status {status}")]
    Rejected {
        /// HTTP-style status code reported by the store.
        status: u16,
    },
}

/// Async trait for a schemaless remote document store.
///
/// Documents are string-keyed field maps grouped into named collections.
/// The store assigns ids on insert and never interprets field contents,
/// with one exception: a null field value in an update means "remove this
/// field from the document".
///
/// Query results and their ordering must be stable across calls while the
/// underlying data is unchanged, so repeated refreshes of an unchanged
/// collection produce identical snapshots.
pub trait RemoteStore: Send + Sync {
    /// Inserts a new document and returns its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or refuses the
    /// document.
    fn insert(
        &self,
        collection: &str,
        fields: Fields,
    ) -> impl std::future::Future<Output = Result<String, StoreError>> + Send;

    /// Returns every document in the collection whose `field` equals
    /// `value`, in stable id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Fetches a single document by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such document exists, or
    /// another error if the store cannot be reached.
    fn fetch_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Document, StoreError>> + Send;

    /// Merges the given fields into an existing document. Fields not named
    /// are left untouched; fields set to null are removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such document exists, or
    /// another error if the store cannot be reached.
    fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a document by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such document exists, or
    /// another error if the store cannot be reached.
    fn delete_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
