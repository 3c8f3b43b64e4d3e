//! Room registry - this tab's authoritative view of all rooms
//!
//! The registry is plain data. It keeps `messages`, `last_message` and
//! `unread_count` consistent; persisting and notifying after a mutation
//! is the chat service's job.

use std::collections::HashMap;

use crate::invariants::assert_room_invariants;
use crate::models::{ChatMessage, ChatRoom};

/// Insertion-ordered map of room id to room
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, ChatRoom>,
    /// Room ids in first-insertion order
    order: Vec<String>,
}

impl RoomRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from a stored snapshot (later duplicates replace earlier ones)
    pub fn from_rooms(rooms: Vec<ChatRoom>) -> Self {
        let mut registry = Self::new();
        for room in rooms {
            registry.insert(room);
        }
        registry
    }

    /// Insert or replace a room. A replaced room keeps its position.
    pub fn insert(&mut self, room: ChatRoom) {
        if !self.rooms.contains_key(&room.id) {
            self.order.push(room.id.clone());
        }
        self.rooms.insert(room.id.clone(), room);
    }

    pub fn get(&self, room_id: &str) -> Option<&ChatRoom> {
        self.rooms.get(room_id)
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Snapshot of all rooms in insertion order
    pub fn rooms(&self) -> Vec<ChatRoom> {
        self.order
            .iter()
            .filter_map(|id| self.rooms.get(id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Append `message` to an existing room.
    ///
    /// The unread counter only moves for messages whose sender differs from
    /// `local_user_id`, so a tab never counts its own user's messages.
    /// Returns false (and drops the message) if the room is unknown.
    pub fn apply_incoming_message(
        &mut self,
        room_id: &str,
        message: ChatMessage,
        local_user_id: Option<&str>,
    ) -> bool {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let foreign = local_user_id.map_or(true, |id| !message.is_from(id));
        room.push_message(message);
        if foreign {
            room.unread_count = room.unread_count.saturating_add(1);
        }
        assert_room_invariants(room);
        true
    }

    /// Mark one message read. Does not touch the unread counter.
    pub fn apply_read_receipt(&mut self, room_id: &str, message_id: &str) -> bool {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return false;
        };
        let Some(message) = room.find_message_mut(message_id) else {
            return false;
        };
        message.is_read = true;
        if let Some(last) = room.last_message.as_mut().filter(|m| m.id == message_id) {
            last.is_read = true;
        }
        assert_room_invariants(room);
        true
    }

    /// Mark every message not sent by `local_user_id` read and zero the counter
    pub fn mark_room_read(&mut self, room_id: &str, local_user_id: &str) -> bool {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return false;
        };
        for message in room.messages.iter_mut().filter(|m| !m.is_from(local_user_id)) {
            message.is_read = true;
        }
        room.unread_count = 0;
        room.normalize();
        assert_room_invariants(room);
        true
    }

    /// Sum of unread counters across all rooms
    pub fn total_unread(&self) -> u64 {
        self.rooms.values().map(|r| u64::from(r.unread_count)).sum()
    }

    /// Drop every room
    pub fn clear(&mut self) {
        self.rooms.clear();
        self.order.clear();
    }
}
