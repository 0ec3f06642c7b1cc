//! Session-scoped task data layer.
//!
//! Three pieces stack on top of a [`RemoteStore`](crate::store::RemoteStore):
//! the [`TaskRepository`] does per-owner CRUD against the store, the
//! [`TaskCache`] holds the latest fetched snapshot for synchronous reads,
//! and the [`TaskMutationCoordinator`] validates mutations and keeps the
//! cache in step with the store.

pub mod cache;
pub mod coordinator;
pub mod repository;

pub use cache::TaskCache;
pub use coordinator::TaskMutationCoordinator;
pub use repository::TaskRepository;

use simpletask_core::task::TaskId;
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during task operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// No user is signed in.
    #[error("no user is signed in")]
    NotAuthenticated,
    /// The task payload failed validation.
    #[error("invalid task: {0}")]
    Validation(&'static str),
    /// Task with the given id was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// The remote store failed or could not be reached.
    #[error("remote store unavailable")]
    RemoteUnavailable(#[source] StoreError),
}

impl From<StoreError> for TaskError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound(TaskId::new(id)),
            other => Self::RemoteUnavailable(other),
        }
    }
}
