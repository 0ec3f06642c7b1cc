//! Authenticated user session.
//!
//! An [`AuthSession`] tracks which user, if any, is currently signed in.
//! It is passed explicitly to everything that needs the current owner;
//! there is no global sign-in state. Observers hold a [`SessionHandle`],
//! a cheap clone that reads the current owner and awaits sign-in and
//! sign-out transitions. Dropping the `AuthSession` ends the stream of
//! transitions, which long-lived observers use as their shutdown signal.

use simpletask_core::task::OwnerId;
use tokio::sync::watch;

/// Owner of the sign-in state. One per app.
#[derive(Debug)]
pub struct AuthSession {
    tx: watch::Sender<Option<OwnerId>>,
}

impl AuthSession {
    /// Creates a signed-out session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx: watch::channel(None).0,
        }
    }

    /// Creates a session already signed in as `owner`.
    #[must_use]
    pub fn signed_in(owner: OwnerId) -> Self {
        Self {
            tx: watch::channel(Some(owner)).0,
        }
    }

    /// Signs in as `owner`, replacing any previous sign-in.
    pub fn sign_in(&self, owner: OwnerId) {
        self.tx.send_replace(Some(owner));
    }

    /// Signs out.
    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }

    /// Returns the currently signed-in owner, if any.
    #[must_use]
    pub fn current_owner(&self) -> Option<OwnerId> {
        self.tx.borrow().clone()
    }

    /// Creates an observer handle onto this session.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of an [`AuthSession`].
///
/// Handles observe the latest sign-in state, not every intermediate
/// transition: rapid sign-in and sign-out pairs coalesce into whatever
/// state is current when the observer looks.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<Option<OwnerId>>,
}

impl SessionHandle {
    /// Returns the currently signed-in owner, if any.
    #[must_use]
    pub fn current_owner(&self) -> Option<OwnerId> {
        self.rx.borrow().clone()
    }

    /// Waits for the sign-in state to change.
    ///
    /// Returns `true` when it changed, `false` when the session itself has
    /// been dropped and no further changes can happen.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
