//! Remote CRUD for task documents.
//!
//! The repository is the only component that talks to the store about
//! tasks. Reads and creates are scoped to the signed-in owner of the
//! session passed at construction; nothing here consults global state.

use std::sync::Arc;

use chrono::Utc;
use simpletask_core::task::{OWNER_FIELD, OwnerId, Task, TaskDraft, TaskId, TaskPatch};
use tracing::{debug, warn};

use super::TaskError;
use crate::config::{ClientConfig, ErrorPolicy};
use crate::session::SessionHandle;
use crate::store::{RemoteStore, StoreError};

/// Per-owner task CRUD against a [`RemoteStore`].
pub struct TaskRepository<S> {
    store: Arc<S>,
    session: SessionHandle,
    collection: String,
    on_update_failure: ErrorPolicy,
    on_delete_failure: ErrorPolicy,
}

impl<S: RemoteStore> TaskRepository<S> {
    /// Creates a repository over `store`, scoped to `session`, with the
    /// default collection name and failure policies.
    #[must_use]
    pub fn new(store: Arc<S>, session: SessionHandle) -> Self {
        Self::with_config(store, session, &ClientConfig::default())
    }

    /// Creates a repository with collection name and failure policies
    /// taken from `config`.
    #[must_use]
    pub fn with_config(store: Arc<S>, session: SessionHandle, config: &ClientConfig) -> Self {
        Self {
            store,
            session,
            collection: config.tasks_collection.clone(),
            on_update_failure: config.on_update_failure,
            on_delete_failure: config.on_delete_failure,
        }
    }

    /// The session this repository is scoped to.
    #[must_use]
    pub const fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Creates a task document owned by the signed-in user.
    ///
    /// The owner id and creation timestamp are stamped here; the returned
    /// [`Task`] is the normalized view of what was stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotAuthenticated`] if no user is signed in
    /// (checked before the store is contacted), or a store error if the
    /// insert fails.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, TaskError> {
        let owner = self
            .session
            .current_owner()
            .ok_or(TaskError::NotAuthenticated)?;
        let fields = draft.into_fields(&owner, Utc::now());
        let id = self.store.insert(&self.collection, fields.clone()).await?;
        debug!(task_id = %id, owner = %owner, "created task");
        Ok(Task::from_fields(TaskId::new(id), &fields))
    }

    /// Lists every task owned by the signed-in user, in stable store
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotAuthenticated`] if no user is signed in, or
    /// a store error if the query fails.
    pub async fn list_for_owner(&self) -> Result<Vec<Task>, TaskError> {
        let owner = self
            .session
            .current_owner()
            .ok_or(TaskError::NotAuthenticated)?;
        self.list(&owner).await
    }

    /// Lists every task owned by `owner`.
    ///
    /// The cache uses this to pin a snapshot to the owner it read the
    /// session as; most callers want [`Self::list_for_owner`].
    ///
    /// # Errors
    ///
    /// Returns a store error if the query fails.
    pub async fn list(&self, owner: &OwnerId) -> Result<Vec<Task>, TaskError> {
        let documents = self
            .store
            .query_by_field(&self.collection, OWNER_FIELD, owner.as_str())
            .await?;
        debug!(owner = %owner, count = documents.len(), "fetched tasks");
        Ok(documents.iter().map(Task::from_document).collect())
    }

    /// Merges `patch` into the task with the given id.
    ///
    /// Updates address the document by id alone; the signed-in owner is
    /// not consulted. Failures follow the configured update policy.
    ///
    /// # Errors
    ///
    /// With [`ErrorPolicy::Propagate`], returns [`TaskError::NotFound`]
    /// for a missing document or a store error for anything else. With
    /// [`ErrorPolicy::LogAndContinue`], failures are logged and reported
    /// as success.
    pub async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<(), TaskError> {
        let result = self
            .store
            .update_by_id(&self.collection, id.as_str(), patch.into_fields())
            .await;
        self.finish_mutation(self.on_update_failure, "update", id, result)
    }

    /// Deletes the task with the given id.
    ///
    /// # Errors
    ///
    /// Same failure handling as [`Self::update`], under the configured
    /// delete policy.
    pub async fn delete(&self, id: &TaskId) -> Result<(), TaskError> {
        let result = self.store.delete_by_id(&self.collection, id.as_str()).await;
        self.finish_mutation(self.on_delete_failure, "delete", id, result)
    }

    fn finish_mutation(
        &self,
        policy: ErrorPolicy,
        operation: &str,
        id: &TaskId,
        result: Result<(), StoreError>,
    ) -> Result<(), TaskError> {
        match result {
            Ok(()) => {
                debug!(task_id = %id, operation, "task mutation applied");
                Ok(())
            }
            Err(err) => match policy {
                ErrorPolicy::Propagate => Err(err.into()),
                ErrorPolicy::LogAndContinue => {
                    warn!(task_id = %id, operation, error = %err, "task mutation failed, continuing");
                    Ok(())
                }
            },
        }
    }
}
