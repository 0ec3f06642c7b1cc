//! Integration tests for the task mutation path.
//!
//! Exercises the coordinator/repository/cache stack end to end against
//! the in-memory store: create, toggle, update, and delete, plus the
//! fail-fast guarantees (validation and auth failures never reach the
//! store, and failed mutations leave the cache untouched).

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{NaiveDate, NaiveTime};
use simpletask::session::AuthSession;
use simpletask::store::memory::MemoryStore;
use simpletask::store::{RemoteStore, StoreError};
use simpletask::tasks::{TaskCache, TaskError, TaskMutationCoordinator, TaskRepository};
use simpletask_core::task::{Document, Fields, OwnerId, Priority, TaskDraft, TaskId, TaskPatch};

// ---------------------------------------------------------------------------
// Helper functions and instrumented stores
// ---------------------------------------------------------------------------

/// Builds a signed-in coordinator stack over an in-memory store.
fn make_stack() -> (
    AuthSession,
    Arc<TaskCache<MemoryStore>>,
    TaskMutationCoordinator<MemoryStore>,
) {
    make_stack_with(Arc::new(MemoryStore::new()))
}

/// Builds a signed-in coordinator stack over the given store.
fn make_stack_with<S: RemoteStore>(
    store: Arc<S>,
) -> (AuthSession, Arc<TaskCache<S>>, TaskMutationCoordinator<S>) {
    let session = AuthSession::signed_in(OwnerId::new("user-1"));
    let repository = Arc::new(TaskRepository::new(store, session.handle()));
    let cache = Arc::new(TaskCache::new(repository));
    let coordinator = TaskMutationCoordinator::new(Arc::clone(&cache));
    (session, cache, coordinator)
}

/// Store wrapper that counts writes, for asserting fail-fast behavior.
#[derive(Debug, Default)]
struct CountingStore {
    inner: MemoryStore,
    inserts: AtomicUsize,
}

impl RemoteStore for CountingStore {
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(collection, fields).await
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
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

/// Store wrapper whose mutations can be switched to fail.
#[derive(Debug, Default)]
struct FailingStore {
    inner: MemoryStore,
    fail_mutations: AtomicBool,
}

impl FailingStore {
    fn check(&self) -> Result<(), StoreError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(StoreError::Unreachable("injected failure".to_string()));
        }
        Ok(())
    }
}

impl RemoteStore for FailingStore {
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.check()?;
        self.inner.insert(collection, fields).await
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
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
        self.check()?;
        self.inner.update_by_id(collection, id, fields).await
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete_by_id(collection, id).await
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_toggle_reopen_delete_lifecycle() {
    let (_session, _cache, coordinator) = make_stack();

    let draft = TaskDraft::new("Buy milk")
        .with_description("two liters")
        .with_priority(Priority::High)
        .with_date(NaiveDate::from_ymd_opt(2026, 8, 24).unwrap())
        .with_time(NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    let tasks = coordinator.create_task(draft).await.unwrap();
    assert_eq!(tasks.len(), 1);

    let task = &tasks[0];
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.description.as_deref(), Some("two liters"));
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.date.as_deref(), Some("2026-08-24"));
    assert_eq!(task.time.as_deref(), Some("09:30"));
    assert!(!task.completed);
    assert!(task.completed_at.is_none());

    // Complete it.
    let id = task.id.clone();
    let tasks = coordinator.toggle_completion(&id, false).await.unwrap();
    assert!(tasks[0].completed);
    assert!(tasks[0].completed_at.is_some());

    // Reopen it; the completion timestamp must clear.
    let tasks = coordinator.toggle_completion(&id, true).await.unwrap();
    assert!(!tasks[0].completed);
    assert!(tasks[0].completed_at.is_none());

    let tasks = coordinator.delete_task(&id).await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn update_changes_title_and_clears_date() {
    let (_session, _cache, coordinator) = make_stack();

    let draft =
        TaskDraft::new("Old title").with_date(NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
    let tasks = coordinator.create_task(draft).await.unwrap();
    let id = tasks[0].id.clone();

    let patch = TaskPatch {
        title: Some("New title".to_string()),
        date: Some(None),
        ..TaskPatch::default()
    };
    let tasks = coordinator.update_task(&id, patch).await.unwrap();
    assert_eq!(tasks[0].title, "New title");
    assert!(tasks[0].date.is_none());
}

#[tokio::test]
async fn tasks_are_scoped_to_their_owner() {
    let (session, cache, coordinator) = make_stack();

    coordinator
        .create_task(TaskDraft::new("mine"))
        .await
        .unwrap();

    // Another user signs in on the same device and sees only their own.
    session.sign_in(OwnerId::new("user-2"));
    let tasks = coordinator
        .create_task(TaskDraft::new("theirs"))
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "theirs");

    session.sign_in(OwnerId::new("user-1"));
    let tasks = cache.refresh().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "mine");
}

// ---------------------------------------------------------------------------
// Fail-fast guarantees
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_title_fails_validation_without_store_calls() {
    let store = Arc::new(CountingStore::default());
    let (_session, _cache, coordinator) = make_stack_with(Arc::clone(&store));

    let err = coordinator
        .create_task(TaskDraft::new("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::Validation(_)));
    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn signed_out_create_fails_without_store_calls() {
    let store = Arc::new(CountingStore::default());
    let (session, _cache, coordinator) = make_stack_with(Arc::clone(&store));
    session.sign_out();

    let err = coordinator
        .create_task(TaskDraft::new("Buy milk"))
        .await
        .unwrap_err();
    assert_eq!(err, TaskError::NotAuthenticated);
    assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_title_patch_is_rejected() {
    let (_session, cache, coordinator) = make_stack();
    let tasks = coordinator
        .create_task(TaskDraft::new("Keep me"))
        .await
        .unwrap();
    let id = tasks[0].id.clone();

    let patch = TaskPatch {
        title: Some("   ".to_string()),
        ..TaskPatch::default()
    };
    let err = coordinator.update_task(&id, patch).await.unwrap_err();
    assert!(matches!(err, TaskError::Validation(_)));

    let tasks = cache.refresh().await.unwrap();
    assert_eq!(tasks[0].title, "Keep me");
}

#[tokio::test]
async fn mutating_a_missing_task_reports_not_found() {
    let (_session, _cache, coordinator) = make_stack();
    let id = TaskId::new("no-such-task");

    let err = coordinator.toggle_completion(&id, false).await.unwrap_err();
    assert_eq!(err, TaskError::NotFound(id.clone()));

    let err = coordinator.delete_task(&id).await.unwrap_err();
    assert_eq!(err, TaskError::NotFound(id));
}

#[tokio::test]
async fn failed_mutation_leaves_cache_untouched() {
    let store = Arc::new(FailingStore::default());
    let (_session, cache, coordinator) = make_stack_with(Arc::clone(&store));

    let tasks = coordinator
        .create_task(TaskDraft::new("Buy milk"))
        .await
        .unwrap();
    let id = tasks[0].id.clone();

    store.fail_mutations.store(true, Ordering::SeqCst);
    let err = coordinator.delete_task(&id).await.unwrap_err();
    assert!(matches!(err, TaskError::RemoteUnavailable(_)));

    // The snapshot still shows the task exactly as before the failure.
    let cached = cache.get();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].title, "Buy milk");
}
