//! Storage traits
//!
//! The chat core persists through a flat string key/value interface,
//! the same shape as a browser profile's local storage. Implementations
//! may be backed by SQLite or by process memory.

use std::sync::{Mutex, PoisonError};

use crate::error::Result;
use crate::storage::Database;

/// Profile-scoped key/value storage
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key` (no-op if absent)
    fn remove(&self, key: &str) -> Result<()>;
}

impl KeyValueStore for Mutex<Database> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let db = self.lock().unwrap_or_else(PoisonError::into_inner);
        db.key_values().get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let db = self.lock().unwrap_or_else(PoisonError::into_inner);
        db.key_values().set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let db = self.lock().unwrap_or_else(PoisonError::into_inner);
        db.key_values().remove(key)
    }
}
