//! Current-user resolution
//!
//! Identity is looked up on every call: a login that completes in another
//! tab must be picked up without a reload.

use std::sync::Arc;

use crate::models::{Identity, UserSnapshot};
use crate::storage::{load_last_user, KeyValueStore};

/// The authentication collaborator
pub trait AuthProvider: Send + Sync {
    /// The currently authenticated user, if any. Must not panic.
    fn current_user(&self) -> Option<UserSnapshot>;
}

/// An auth provider that never has a user
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl AuthProvider for Anonymous {
    fn current_user(&self) -> Option<UserSnapshot> {
        None
    }
}

/// Resolves the active identity from auth, then from the stored record
pub struct UserResolver {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn KeyValueStore>,
    user_key: String,
}

impl UserResolver {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn KeyValueStore>,
        user_key: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            store,
            user_key: user_key.into(),
        }
    }

    /// Best-effort current user: auth collaborator, then last known user
    pub fn current_user(&self) -> Option<UserSnapshot> {
        self.auth
            .current_user()
            .or_else(|| load_last_user(self.store.as_ref(), &self.user_key))
    }

    /// Current user, or a freshly minted guest
    pub fn resolve_or_guest(&self) -> Identity {
        match self.current_user() {
            Some(user) => Identity::Authenticated(user),
            None => Identity::guest(),
        }
    }
}
