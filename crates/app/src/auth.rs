//! Session-backed auth collaborator
//!
//! One session is shared by every tab of the profile, so signing in or out
//! from any tab changes the identity the others resolve on their next call.

use std::sync::{Arc, PoisonError, RwLock};

use tabchat_core::storage::save_last_user;
use tabchat_core::{AuthProvider, KeyValueStore, UserSnapshot};
use tracing::{info, warn};

#[derive(Clone)]
pub struct SessionAuth {
    current: Arc<RwLock<Option<UserSnapshot>>>,
    store: Arc<dyn KeyValueStore>,
    user_key: String,
}

impl SessionAuth {
    pub fn new(store: Arc<dyn KeyValueStore>, user_key: impl Into<String>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            store,
            user_key: user_key.into(),
        }
    }

    /// Sign in and remember the user in the profile
    pub fn login(&self, user: UserSnapshot) {
        if let Err(e) = save_last_user(self.store.as_ref(), &self.user_key, &user) {
            warn!(user_id = %user.id, error = %e, "Failed to record last known user");
        }
        info!(user_id = %user.id, role = %user.role, "Signed in");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    /// Sign out and forget the remembered user
    pub fn logout(&self) {
        let previous = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Err(e) = self.store.remove(&self.user_key) {
            warn!(error = %e, "Failed to clear last known user");
        }
        if let Some(user) = previous {
            info!(user_id = %user.id, "Signed out");
        }
    }
}

impl AuthProvider for SessionAuth {
    fn current_user(&self) -> Option<UserSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
