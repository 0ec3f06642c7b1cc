//! Background session-to-cache synchronization.
//!
//! A small worker that keeps the task cache in step with sign-in state:
//! sign-in and owner switches trigger a refresh, sign-out clears the
//! cache. Auth providers deliver the current state to new subscribers
//! before any transitions, and the worker mirrors that: it handles the
//! state it sees at spawn time first.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::session::SessionHandle;
use crate::store::RemoteStore;
use crate::tasks::TaskCache;

/// Spawns a worker that follows `session` and keeps `cache` current.
///
/// A failed refresh is logged and the previous snapshot stays put; the
/// next sign-in transition retries naturally. The worker finishes when
/// the [`AuthSession`](crate::session::AuthSession) behind the handle is
/// dropped.
pub fn spawn_session_sync<S>(
    mut session: SessionHandle,
    cache: Arc<TaskCache<S>>,
) -> JoinHandle<()>
where
    S: RemoteStore + 'static,
{
    tokio::spawn(async move {
        loop {
            match session.current_owner() {
                Some(owner) => {
                    debug!(owner = %owner, "session signed in, refreshing tasks");
                    if let Err(err) = cache.refresh().await {
                        warn!(error = %err, "session sync refresh failed");
                    }
                }
                None => {
                    debug!("session signed out, clearing tasks");
                    cache.clear();
                }
            }
            if !session.changed().await {
                break;
            }
        }
        debug!("session dropped, sync worker exiting");
    })
}
