//! Document server core: shared state, collection routes, and handlers.
//!
//! The server exposes the document store over a small JSON HTTP API.
//! Collections are addressed by name and spring into existence on first
//! insert:
//!
//! - `POST /v1/{collection}` inserts a document, answering `201` with
//!   the assigned id.
//! - `GET /v1/{collection}?field=F&value=V` lists matching documents.
//! - `GET /v1/{collection}/{id}` fetches one document, `404` if absent.
//! - `PATCH /v1/{collection}/{id}` merges fields into a document, where
//!   a `null` value removes the field. `204`, or `404` if absent.
//! - `DELETE /v1/{collection}/{id}` removes a document. `204`, or `404`
//!   if absent.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use simpletask_core::task::Fields;

use crate::store::DocumentStore;

/// Query string for filtered collection reads: `?field=F&value=V`.
#[derive(Debug, serde::Deserialize)]
struct QueryParams {
    field: String,
    value: String,
}

/// Inserts a document and answers with the store-assigned id.
async fn insert_document(
    State(store): State<Arc<DocumentStore>>,
    Path(collection): Path<String>,
    Json(fields): Json<Fields>,
) -> impl IntoResponse {
    let id = store.insert(&collection, fields).await;
    tracing::debug!(collection = %collection, id = %id, "document inserted");
    (StatusCode::CREATED, Json(json!({ "id": id })))
}

/// Lists documents whose `field` equals `value`, in id order.
async fn query_documents(
    State(store): State<Arc<DocumentStore>>,
    Path(collection): Path<String>,
    Query(params): Query<QueryParams>,
) -> impl IntoResponse {
    let documents = store
        .query_by_field(&collection, &params.field, &params.value)
        .await;
    tracing::debug!(
        collection = %collection,
        field = %params.field,
        count = documents.len(),
        "query served"
    );
    Json(documents)
}

/// Fetches a single document by id.
async fn fetch_document(
    State(store): State<Arc<DocumentStore>>,
    Path((collection, id)): Path<(String, String)>,
) -> impl IntoResponse {
    match store.fetch(&collection, &id).await {
        Some(document) => Json(document).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Merges fields into a document; a `null` value removes the field.
async fn update_document(
    State(store): State<Arc<DocumentStore>>,
    Path((collection, id)): Path<(String, String)>,
    Json(fields): Json<Fields>,
) -> StatusCode {
    if store.update(&collection, &id, fields).await {
        tracing::debug!(collection = %collection, id = %id, "document updated");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Removes a document by id.
async fn delete_document(
    State(store): State<Arc<DocumentStore>>,
    Path((collection, id)): Path<(String, String)>,
) -> StatusCode {
    if store.delete(&collection, &id).await {
        tracing::debug!(collection = %collection, id = %id, "document deleted");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Starts the document server on the given address and returns the bound
/// address and a join handle.
///
/// This is the primary entry point used by both `main.rs` and test code.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(DocumentStore::new())).await
}

/// Starts the document server with a pre-populated [`DocumentStore`].
///
/// Use [`DocumentStore::upsert`] beforehand to seed documents whose ids
/// are meaningful, like user profiles.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    store: Arc<DocumentStore>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = axum::Router::new()
        .route(
            "/v1/{collection}",
            axum::routing::post(insert_document).get(query_documents),
        )
        .route(
            "/v1/{collection}/{id}",
            axum::routing::get(fetch_document)
                .patch(update_document)
                .delete(delete_document),
        )
        .with_state(store);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "document server error");
        }
    });

    Ok((bound_addr, handle))
}

/// Starts the document server in-process for testing.
///
/// Binds to `127.0.0.1:0` (OS-assigned port) and returns the bound
/// address and a [`tokio::task::JoinHandle`] for cleanup.
#[cfg(test)]
pub async fn start_test_server() -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    start_server("127.0.0.1:0")
        .await
        .expect("failed to start test server")
}
