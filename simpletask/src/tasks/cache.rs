//! Snapshot cache over the task repository.
//!
//! Holds the most recently fetched task list so views can read
//! synchronously between refreshes. The cache never invents state: it
//! only ever holds what the last successful fetch returned, tagged with
//! the owner it was fetched for.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use simpletask_core::task::{OwnerId, Task};
use std::sync::Arc;
use tracing::debug;

use super::{TaskError, TaskRepository};
use crate::session::SessionHandle;
use crate::store::RemoteStore;

struct CacheSlot {
    owner: OwnerId,
    tasks: Vec<Task>,
    last_loaded_at: DateTime<Utc>,
}

/// Owner-tagged snapshot of the signed-in user's tasks.
pub struct TaskCache<S> {
    repository: Arc<TaskRepository<S>>,
    session: SessionHandle,
    slot: RwLock<Option<CacheSlot>>,
}

impl<S: RemoteStore> TaskCache<S> {
    /// Creates an empty cache reading through `repository`, observing the
    /// same session the repository is scoped to.
    #[must_use]
    pub fn new(repository: Arc<TaskRepository<S>>) -> Self {
        let session = repository.session().clone();
        Self {
            repository,
            session,
            slot: RwLock::new(None),
        }
    }

    /// The repository this cache reads through.
    #[must_use]
    pub const fn repository(&self) -> &Arc<TaskRepository<S>> {
        &self.repository
    }

    /// Returns the cached snapshot for the signed-in owner.
    ///
    /// Empty when nothing has been loaded yet, and empty when the cached
    /// snapshot belongs to a different owner than the one currently
    /// signed in. Never touches the store.
    #[must_use]
    pub fn get(&self) -> Vec<Task> {
        let current = self.session.current_owner();
        let slot = self.slot.read();
        match (slot.as_ref(), current) {
            (Some(slot), Some(owner)) if slot.owner == owner => slot.tasks.clone(),
            _ => Vec::new(),
        }
    }

    /// When the current owner's snapshot was fetched, if one is loaded.
    #[must_use]
    pub fn last_loaded_at(&self) -> Option<DateTime<Utc>> {
        let current = self.session.current_owner()?;
        let slot = self.slot.read();
        slot.as_ref()
            .filter(|s| s.owner == current)
            .map(|s| s.last_loaded_at)
    }

    /// Refetches the signed-in owner's tasks and replaces the snapshot.
    ///
    /// The fetch runs without holding the cache lock; only the final swap
    /// takes it, briefly. On failure the previous snapshot is left
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotAuthenticated`] if no user is signed in, or
    /// the repository's error if the fetch fails.
    pub async fn refresh(&self) -> Result<Vec<Task>, TaskError> {
        let owner = self
            .session
            .current_owner()
            .ok_or(TaskError::NotAuthenticated)?;
        let tasks = self.repository.list(&owner).await?;
        let mut slot = self.slot.write();
        *slot = Some(CacheSlot {
            owner,
            tasks: tasks.clone(),
            last_loaded_at: Utc::now(),
        });
        drop(slot);
        debug!(count = tasks.len(), "task cache refreshed");
        Ok(tasks)
    }

    /// Drops any cached snapshot.
    pub fn clear(&self) {
        *self.slot.write() = None;
        debug!("task cache cleared");
    }
}
