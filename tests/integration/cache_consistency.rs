//! Integration tests for cache snapshot consistency.
//!
//! The cache must never serve one user's tasks to another, must survive
//! failed refreshes with its previous snapshot intact, and must only
//! change through explicit refresh or clear.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use simpletask::session::AuthSession;
use simpletask::store::memory::MemoryStore;
use simpletask::store::{RemoteStore, StoreError};
use simpletask::tasks::{TaskCache, TaskError, TaskRepository};
use simpletask_core::task::{Document, Fields, OwnerId, TaskDraft};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Builds a signed-in cache over an in-memory store.
fn make_cache() -> (AuthSession, Arc<TaskCache<MemoryStore>>) {
    make_cache_with(Arc::new(MemoryStore::new()))
}

/// Builds a signed-in cache over the given store.
fn make_cache_with<S: RemoteStore>(store: Arc<S>) -> (AuthSession, Arc<TaskCache<S>>) {
    let session = AuthSession::signed_in(OwnerId::new("user-1"));
    let repository = Arc::new(TaskRepository::new(store, session.handle()));
    (session, Arc::new(TaskCache::new(repository)))
}

/// Store wrapper whose list queries can be switched to fail.
#[derive(Debug, Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_queries: AtomicBool,
}

impl RemoteStore for FlakyStore {
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.inner.insert(collection, fields).await
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Unreachable("injected failure".to_string()));
        }
        self.inner.query_by_field(collection, field, value).await
    }

    async fn fetch_by_id(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        self.inner.fetch_by_id(collection, id).await
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.inner.update_by_id(collection, id, fields).await
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.delete_by_id(collection, id).await
    }
}

// ---------------------------------------------------------------------------
// Snapshot lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_until_first_refresh() {
    let (_session, cache) = make_cache();
    cache
        .repository()
        .create(TaskDraft::new("Buy milk"))
        .await
        .unwrap();

    assert!(cache.get().is_empty());
    assert!(cache.last_loaded_at().is_none());

    let tasks = cache.refresh().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(cache.get().len(), 1);
    assert!(cache.last_loaded_at().is_some());
}

#[tokio::test]
async fn refresh_picks_up_store_changes() {
    let (_session, cache) = make_cache();
    cache
        .repository()
        .create(TaskDraft::new("first"))
        .await
        .unwrap();
    cache.refresh().await.unwrap();

    cache
        .repository()
        .create(TaskDraft::new("second"))
        .await
        .unwrap();
    // The snapshot is a point-in-time copy; the new task appears only
    // after the next refresh.
    assert_eq!(cache.get().len(), 1);
    assert_eq!(cache.refresh().await.unwrap().len(), 2);
}

#[tokio::test]
async fn clear_drops_the_snapshot() {
    let (_session, cache) = make_cache();
    cache
        .repository()
        .create(TaskDraft::new("Buy milk"))
        .await
        .unwrap();
    cache.refresh().await.unwrap();

    cache.clear();
    assert!(cache.get().is_empty());
    assert!(cache.last_loaded_at().is_none());
}

// ---------------------------------------------------------------------------
// Owner scoping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn owner_switch_masks_the_snapshot_without_refresh() {
    let (session, cache) = make_cache();
    cache
        .repository()
        .create(TaskDraft::new("mine"))
        .await
        .unwrap();
    cache.refresh().await.unwrap();

    // Another owner signs in; the stale snapshot must not leak to them.
    session.sign_in(OwnerId::new("user-2"));
    assert!(cache.get().is_empty());
    assert!(cache.last_loaded_at().is_none());

    // The original owner returns; their snapshot is still held.
    session.sign_in(OwnerId::new("user-1"));
    assert_eq!(cache.get().len(), 1);
}

#[tokio::test]
async fn refresh_rekeys_the_snapshot_to_the_new_owner() {
    let (session, cache) = make_cache();
    cache
        .repository()
        .create(TaskDraft::new("mine"))
        .await
        .unwrap();
    cache.refresh().await.unwrap();

    session.sign_in(OwnerId::new("user-2"));
    let tasks = cache.refresh().await.unwrap();
    assert!(tasks.is_empty());
    assert!(cache.last_loaded_at().is_some());

    // The old owner's snapshot was replaced, not retained alongside.
    session.sign_in(OwnerId::new("user-1"));
    assert!(cache.get().is_empty());
}

#[tokio::test]
async fn signed_out_cache_is_empty_and_refresh_errors() {
    let (session, cache) = make_cache();
    cache
        .repository()
        .create(TaskDraft::new("Buy milk"))
        .await
        .unwrap();
    cache.refresh().await.unwrap();

    session.sign_out();
    assert!(cache.get().is_empty());
    assert_eq!(cache.refresh().await.unwrap_err(), TaskError::NotAuthenticated);
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_refresh_keeps_the_previous_snapshot() {
    let store = Arc::new(FlakyStore::default());
    let (_session, cache) = make_cache_with(Arc::clone(&store));
    cache
        .repository()
        .create(TaskDraft::new("Buy milk"))
        .await
        .unwrap();
    cache.refresh().await.unwrap();

    store.fail_queries.store(true, Ordering::SeqCst);
    let err = cache.refresh().await.unwrap_err();
    assert!(matches!(err, TaskError::RemoteUnavailable(_)));

    // The previous snapshot survives the failed refresh.
    assert_eq!(cache.get().len(), 1);
    assert_eq!(cache.get()[0].title, "Buy milk");
}
