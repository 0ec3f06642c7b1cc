//! Mutation flows that keep the cache in step with the store.
//!
//! Every mutation follows the same shape: validate locally, apply through
//! the repository, then refetch the whole snapshot into the cache. The
//! refetch is deliberate; the store is the source of truth, so the cache
//! is never patched in place with what a mutation "should" have done.

use std::sync::Arc;

use chrono::Utc;
use simpletask_core::task::{Task, TaskDraft, TaskId, TaskPatch};

use super::{TaskCache, TaskError, TaskRepository};
use crate::store::RemoteStore;

const EMPTY_TITLE: &str = "task title cannot be empty";

/// Validates and applies task mutations, returning the refreshed
/// snapshot after each one.
pub struct TaskMutationCoordinator<S> {
    repository: Arc<TaskRepository<S>>,
    cache: Arc<TaskCache<S>>,
}

impl<S: RemoteStore> TaskMutationCoordinator<S> {
    /// Creates a coordinator over `cache` and the repository it reads
    /// through.
    #[must_use]
    pub fn new(cache: Arc<TaskCache<S>>) -> Self {
        Self {
            repository: Arc::clone(cache.repository()),
            cache,
        }
    }

    /// Creates a task from `draft`, then refreshes the cache.
    ///
    /// A title that trims to empty is rejected before the store sees
    /// anything; an accepted title is stored verbatim, surrounding
    /// whitespace included.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] for an empty title,
    /// [`TaskError::NotAuthenticated`] if no user is signed in, or a
    /// store error from the insert or the refresh.
    pub async fn create_task(&self, draft: TaskDraft) -> Result<Vec<Task>, TaskError> {
        if draft.title.trim().is_empty() {
            return Err(TaskError::Validation(EMPTY_TITLE));
        }
        self.repository.create(draft).await?;
        self.cache.refresh().await
    }

    /// Flips a task's completion state, then refreshes the cache.
    ///
    /// `currently_completed` is the state the caller last saw. The patch
    /// sets the opposite and pairs `completedAt` with it: stamped now when
    /// completing, cleared when reopening.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for an unknown id (subject to the
    /// repository's update policy), or a store error from the update or
    /// the refresh.
    pub async fn toggle_completion(
        &self,
        id: &TaskId,
        currently_completed: bool,
    ) -> Result<Vec<Task>, TaskError> {
        let patch = TaskPatch {
            completed: Some(!currently_completed),
            completed_at: Some(if currently_completed {
                None
            } else {
                Some(Utc::now())
            }),
            ..TaskPatch::default()
        };
        self.repository.update(id, patch).await?;
        self.cache.refresh().await
    }

    /// Applies `patch` to a task, then refreshes the cache.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] if the patch sets a title that
    /// trims to empty, [`TaskError::NotFound`] for an unknown id (subject
    /// to the repository's update policy), or a store error from the
    /// update or the refresh.
    pub async fn update_task(
        &self,
        id: &TaskId,
        patch: TaskPatch,
    ) -> Result<Vec<Task>, TaskError> {
        if let Some(title) = &patch.title
            && title.trim().is_empty()
        {
            return Err(TaskError::Validation(EMPTY_TITLE));
        }
        self.repository.update(id, patch).await?;
        self.cache.refresh().await
    }

    /// Deletes a task, then refreshes the cache.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for an unknown id (subject to the
    /// repository's delete policy), or a store error from the delete or
    /// the refresh.
    pub async fn delete_task(&self, id: &TaskId) -> Result<Vec<Task>, TaskError> {
        self.repository.delete(id).await?;
        self.cache.refresh().await
    }
}
