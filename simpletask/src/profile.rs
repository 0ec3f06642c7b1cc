//! User profile lookup.
//!
//! Profiles are plain documents in the users collection, keyed by the
//! owner id itself rather than a store-assigned id. They are written by
//! the registration flow, which lives outside this crate; here they are
//! read-only.

use std::sync::Arc;

use serde_json::Value;
use simpletask_core::task::{Fields, OwnerId};
use tracing::debug;

use crate::config::ClientConfig;
use crate::store::{RemoteStore, StoreError};

/// A user's profile document, normalized for display.
///
/// Every field is optional; the UI substitutes placeholders for missing
/// ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// Display name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Builds a profile from a stored document's fields. Missing, empty,
    /// or mistyped entries become `None`.
    #[must_use]
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            name: str_field(fields, "name"),
            email: str_field(fields, "email"),
            avatar_url: str_field(fields, "avatarUrl"),
        }
    }
}

fn str_field(fields: &Fields, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Read-only access to user profile documents.
pub struct ProfileRepository<S> {
    store: Arc<S>,
    collection: String,
}

impl<S: RemoteStore> ProfileRepository<S> {
    /// Creates a profile repository over `store` with the default users
    /// collection.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, &ClientConfig::default())
    }

    /// Creates a profile repository with the users collection taken from
    /// `config`.
    #[must_use]
    pub fn with_config(store: Arc<S>, config: &ClientConfig) -> Self {
        Self {
            store,
            collection: config.users_collection.clone(),
        }
    }

    /// Fetches the profile document for `owner`.
    ///
    /// A user without a profile document is normal, not an error: that
    /// case reads as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the store cannot be reached or answers
    /// with something unexpected.
    pub async fn fetch(&self, owner: &OwnerId) -> Result<Option<UserProfile>, StoreError> {
        match self.store.fetch_by_id(&self.collection, owner.as_str()).await {
            Ok(doc) => Ok(Some(UserProfile::from_fields(&doc.fields))),
            Err(StoreError::NotFound { .. }) => {
                debug!(owner = %owner, "no profile document");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
