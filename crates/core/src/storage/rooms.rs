//! Room snapshot persistence
//!
//! The whole room list is written as one JSON array under a single key.
//! Writes are full snapshots, not diffs; this is fine for a handful of
//! support rooms but grows linearly with history.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::ChatRoom;
use crate::storage::KeyValueStore;

/// How a save treats whatever another tab wrote since our last load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPolicy {
    /// Overwrite the stored snapshot with ours
    #[default]
    LastWriterWins,
    /// Union our rooms with the stored ones by message id before writing
    Merge,
}

/// Persistent store adapter for the room registry
pub struct RoomStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    policy: SnapshotPolicy,
}

impl RoomStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, policy: SnapshotPolicy) -> Self {
        Self {
            store,
            key: key.into(),
            policy,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn policy(&self) -> SnapshotPolicy {
        self.policy
    }

    /// Load the stored rooms. Missing or unreadable data yields an empty
    /// list. Rooms that fail to parse are dropped, as are messages that
    /// fail validation; the rest of their room is kept.
    pub fn load(&self) -> Vec<ChatRoom> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read chat rooms, starting fresh");
                return Vec::new();
            }
        };
        parse_snapshot(&self.key, &raw)
    }

    /// Write the full room list
    pub fn save(&self, rooms: &[ChatRoom]) -> Result<()> {
        let json = match self.policy {
            SnapshotPolicy::LastWriterWins => serde_json::to_string(rooms)?,
            SnapshotPolicy::Merge => {
                let stored = self.load();
                serde_json::to_string(&merge_rooms(rooms, &stored))?
            }
        };
        self.store.set(&self.key, &json)?;
        debug!(key = %self.key, rooms = rooms.len(), bytes = json.len(), "Saved chat rooms");
        Ok(())
    }

    /// Remove the stored snapshot
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)
    }
}

fn parse_snapshot(key: &str, raw: &str) -> Vec<ChatRoom> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable chat snapshot");
            return Vec::new();
        }
    };

    let mut rooms = Vec::with_capacity(values.len());
    for value in values {
        let mut room: ChatRoom = match serde_json::from_value(value) {
            Ok(room) => room,
            Err(e) => {
                warn!(key, error = %e, "Dropping malformed room");
                continue;
            }
        };
        let dropped = room.retain_valid_messages();
        if dropped > 0 {
            warn!(key, room_id = %room.id, dropped, "Dropping invalid messages");
        }
        room.normalize();
        rooms.push(room);
    }
    rooms
}

/// Union `local` with `stored`, room by room and message by message.
///
/// Local rooms keep their position and unread counter; rooms only present
/// in `stored` are appended. Within a room, messages known to either side
/// are kept once (read if either side has read it) and ordered by
/// timestamp, ties keeping local order first.
pub fn merge_rooms(local: &[ChatRoom], stored: &[ChatRoom]) -> Vec<ChatRoom> {
    let stored_by_id: HashMap<&str, &ChatRoom> =
        stored.iter().map(|room| (room.id.as_str(), room)).collect();

    let mut merged: Vec<ChatRoom> = local
        .iter()
        .map(|room| match stored_by_id.get(room.id.as_str()) {
            Some(other) => merge_room(room, other),
            None => room.clone(),
        })
        .collect();

    for room in stored {
        if !local.iter().any(|r| r.id == room.id) {
            merged.push(room.clone());
        }
    }
    merged
}

fn merge_room(local: &ChatRoom, stored: &ChatRoom) -> ChatRoom {
    let mut room = local.clone();
    for message in &mut room.messages {
        if let Some(theirs) = stored.messages.iter().find(|m| m.id == message.id) {
            message.is_read |= theirs.is_read;
        }
    }
    for message in &stored.messages {
        if !local.messages.iter().any(|m| m.id == message.id) {
            room.messages.push(message.clone());
        }
    }
    room.messages.sort_by_key(|m| m.timestamp);
    for participant in &stored.participants {
        if !room.participants.contains(participant) {
            room.participants.push(participant.clone());
        }
    }
    room.normalize();
    room
}
