//! Integration tests for the HTTP store against a live document server.
//!
//! Starts `simpletask-server` in-process on an OS-assigned port and runs
//! the client against it: raw store calls and their status mapping, the
//! full coordinator lifecycle, and profile reads.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use simpletask::config::ClientConfig;
use simpletask::profile::ProfileRepository;
use simpletask::session::AuthSession;
use simpletask::store::http::HttpStore;
use simpletask::store::{RemoteStore, StoreError};
use simpletask::tasks::{TaskCache, TaskMutationCoordinator, TaskRepository};
use simpletask_core::task::{Fields, OwnerId, Priority, TaskDraft};
use simpletask_server::server::{start_server, start_server_with_state};
use simpletask_server::store::DocumentStore;
use url::Url;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Starts the document server on an OS-assigned port.
async fn start_test_server() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    start_server("127.0.0.1:0")
        .await
        .expect("failed to start test server")
}

/// Builds an HTTP store pointed at the given server address.
fn make_store(addr: SocketAddr) -> HttpStore {
    HttpStore::new(Url::parse(&format!("http://{addr}")).unwrap())
}

/// Builds a fields map of string values.
fn make_fields(entries: &[(&str, &str)]) -> Fields {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), Value::String((*value).to_string())))
        .collect()
}

// ---------------------------------------------------------------------------
// Raw store calls and status mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insert_then_fetch_round_trips() {
    let (addr, _handle) = start_test_server().await;
    let store = make_store(addr);

    let id = store
        .insert("tasks", make_fields(&[("title", "Buy milk")]))
        .await
        .unwrap();
    let document = store.fetch_by_id("tasks", &id).await.unwrap();
    assert_eq!(document.id, id);
    assert_eq!(
        document.fields.get("title").and_then(Value::as_str),
        Some("Buy milk")
    );
}

#[tokio::test]
async fn missing_documents_map_to_not_found() {
    let (addr, _handle) = start_test_server().await;
    let store = make_store(addr);
    let not_found = StoreError::NotFound {
        collection: "tasks".to_string(),
        id: "missing".to_string(),
    };

    let err = store.fetch_by_id("tasks", "missing").await.unwrap_err();
    assert_eq!(err, not_found);

    let err = store
        .update_by_id("tasks", "missing", make_fields(&[("title", "x")]))
        .await
        .unwrap_err();
    assert_eq!(err, not_found);

    let err = store.delete_by_id("tasks", "missing").await.unwrap_err();
    assert_eq!(err, not_found);
}

#[tokio::test]
async fn query_filters_by_owner_field() {
    let (addr, _handle) = start_test_server().await;
    let store = make_store(addr);

    store
        .insert("tasks", make_fields(&[("uid", "alice"), ("title", "a")]))
        .await
        .unwrap();
    store
        .insert("tasks", make_fields(&[("uid", "bob"), ("title", "b")]))
        .await
        .unwrap();

    let documents = store.query_by_field("tasks", "uid", "alice").await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(
        documents[0].fields.get("title").and_then(Value::as_str),
        Some("a")
    );
}

#[tokio::test]
async fn update_merges_and_null_clears() {
    let (addr, _handle) = start_test_server().await;
    let store = make_store(addr);

    let id = store
        .insert(
            "tasks",
            make_fields(&[("title", "old"), ("description", "keep me")]),
        )
        .await
        .unwrap();

    let mut patch = make_fields(&[("title", "new")]);
    patch.insert("description".to_string(), Value::Null);
    store.update_by_id("tasks", &id, patch).await.unwrap();

    let document = store.fetch_by_id("tasks", &id).await.unwrap();
    assert_eq!(
        document.fields.get("title").and_then(Value::as_str),
        Some("new")
    );
    assert!(!document.fields.contains_key("description"));
}

#[tokio::test]
async fn delete_removes_the_document() {
    let (addr, _handle) = start_test_server().await;
    let store = make_store(addr);

    let id = store
        .insert("tasks", make_fields(&[("title", "x")]))
        .await
        .unwrap();
    store.delete_by_id("tasks", &id).await.unwrap();

    let err = store.fetch_by_id("tasks", &id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn unreachable_server_maps_to_unreachable() {
    // Nothing listens on port 1.
    let store = HttpStore::new(Url::parse("http://127.0.0.1:1").unwrap());
    let err = store
        .insert("tasks", make_fields(&[("title", "x")]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unreachable(_)));
}

#[tokio::test]
async fn unexpected_statuses_map_to_rejected() {
    let (addr, _handle) = start_test_server().await;
    let store = make_store(addr);

    // A two-segment collection name hits the per-document route, which
    // has no POST handler; the server answers 405.
    let err = store
        .insert("tasks/oops", make_fields(&[("title", "x")]))
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::Rejected { status: 405 });
}

// ---------------------------------------------------------------------------
// Full client stack over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn coordinator_lifecycle_over_http() {
    let (addr, _handle) = start_test_server().await;

    let session = AuthSession::signed_in(OwnerId::new("alice"));
    let repository = Arc::new(TaskRepository::new(
        Arc::new(make_store(addr)),
        session.handle(),
    ));
    let cache = Arc::new(TaskCache::new(repository));
    let coordinator = TaskMutationCoordinator::new(Arc::clone(&cache));

    let draft = TaskDraft::new("Buy milk").with_priority(Priority::High);
    let tasks = coordinator.create_task(draft).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Buy milk");
    assert_eq!(tasks[0].priority, Priority::High);
    assert_eq!(tasks[0].owner_id, OwnerId::new("alice"));

    let id = tasks[0].id.clone();
    let tasks = coordinator.toggle_completion(&id, false).await.unwrap();
    assert!(tasks[0].completed);
    assert!(tasks[0].completed_at.is_some());

    let tasks = coordinator.delete_task(&id).await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn profiles_read_over_http() {
    let documents = Arc::new(DocumentStore::new());
    documents
        .upsert(
            "users",
            "alice",
            make_fields(&[("name", "Alice"), ("email", "alice@example.com")]),
        )
        .await;
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", documents)
        .await
        .expect("failed to start test server");

    let profiles = ProfileRepository::with_config(
        Arc::new(make_store(addr)),
        &ClientConfig::default(),
    );

    let profile = profiles.fetch(&OwnerId::new("alice")).await.unwrap().unwrap();
    assert_eq!(profile.name.as_deref(), Some("Alice"));
    assert_eq!(profile.email.as_deref(), Some("alice@example.com"));
    assert!(profile.avatar_url.is_none());

    // A signed-in user without a profile document reads as absent.
    let missing = profiles.fetch(&OwnerId::new("bob")).await.unwrap();
    assert!(missing.is_none());
}
