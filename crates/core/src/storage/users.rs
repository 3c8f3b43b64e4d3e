//! Last-known-user record
//!
//! The storefront keeps the signed-in user as JSON under a profile key.
//! The chat core only reads it as a fallback identity source.

use tracing::warn;

use crate::error::Result;
use crate::models::UserSnapshot;
use crate::storage::KeyValueStore;

/// Read the last known user; unreadable records are treated as absent
pub fn load_last_user(store: &dyn KeyValueStore, key: &str) -> Option<UserSnapshot> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "Failed to read last known user");
            return None;
        }
    };
    match serde_json::from_str::<UserSnapshot>(&raw) {
        Ok(user) if !user.id.trim().is_empty() => Some(user),
        Ok(_) => None,
        Err(e) => {
            warn!(key, error = %e, "Ignoring malformed last known user");
            None
        }
    }
}

/// Record `user` as the last known user
pub fn save_last_user(store: &dyn KeyValueStore, key: &str, user: &UserSnapshot) -> Result<()> {
    let json = serde_json::to_string(user)?;
    store.set(key, &json)
}
