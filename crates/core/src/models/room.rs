//! Chat room model

use serde::{Deserialize, Serialize};

use super::ChatMessage;

/// Prefix for deterministic staff/customer room ids
pub const STAFF_CUSTOMER_PREFIX: &str = "staff_customer";

/// Build the deterministic id for a staff/customer pairing
pub fn staff_customer_room_id(staff_id: &str, customer_id: &str) -> String {
    format!("{}_{}_{}", STAFF_CUSTOMER_PREFIX, staff_id, customer_id)
}

/// A chat room with its full message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub id: String,
    /// Advisory only, not an access-control list
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub last_message: Option<ChatMessage>,
    #[serde(default)]
    pub unread_count: u32,
}

impl ChatRoom {
    pub fn new(id: impl Into<String>, participants: Vec<String>) -> Self {
        Self {
            id: id.into(),
            participants,
            messages: Vec::new(),
            last_message: None,
            unread_count: 0,
        }
    }

    /// Append a message and keep `last_message` on the tail
    pub fn push_message(&mut self, message: ChatMessage) {
        self.last_message = Some(message.clone());
        self.messages.push(message);
    }

    pub fn find_message_mut(&mut self, message_id: &str) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().find(|m| m.id == message_id)
    }

    /// Drop messages that fail validation. Returns how many were dropped.
    pub fn retain_valid_messages(&mut self) -> usize {
        let before = self.messages.len();
        self.messages.retain(|message| message.validate().is_ok());
        before - self.messages.len()
    }

    /// Re-derive the cached `last_message` from the log tail
    pub fn normalize(&mut self) {
        self.last_message = self.messages.last().cloned();
    }
}
