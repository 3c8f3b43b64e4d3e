//! Chat subsystem configuration
//!
//! Usually embedded as the `[chat]` table of the application config file.

use serde::{Deserialize, Serialize};

use crate::storage::SnapshotPolicy;

/// Storage key holding the JSON array of rooms
pub const DEFAULT_ROOMS_KEY: &str = "chat_rooms";
/// Storage key holding the last known user
pub const DEFAULT_USER_KEY: &str = "user";
/// Broadcast channel shared by all tabs
pub const DEFAULT_CHANNEL_NAME: &str = "chat_channel";
/// Events buffered per tab before a slow tab starts losing them
pub const DEFAULT_BUS_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub rooms_key: String,
    pub user_key: String,
    pub channel_name: String,
    pub snapshot_policy: SnapshotPolicy,
    pub bus_capacity: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            rooms_key: DEFAULT_ROOMS_KEY.to_string(),
            user_key: DEFAULT_USER_KEY.to_string(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            snapshot_policy: SnapshotPolicy::default(),
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}
