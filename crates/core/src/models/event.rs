//! Cross-tab event payloads
//!
//! Serialized as `{"type": "...", "data": {...}}`.

use serde::{Deserialize, Serialize};

use super::ChatMessage;

/// Events exchanged between tabs on the chat channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatEvent {
    /// A message was appended to a room
    #[serde(rename_all = "camelCase")]
    NewMessage { room_id: String, message: ChatMessage },

    /// A single message was marked as read
    #[serde(rename_all = "camelCase")]
    MessageRead { room_id: String, message_id: String },

    /// Typing indicator (received but not acted upon)
    #[serde(rename_all = "camelCase")]
    UserTyping {
        room_id: String,
        user_id: String,
        #[serde(default)]
        is_typing: bool,
    },
}

impl ChatEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::NewMessage { .. } => "NEW_MESSAGE",
            ChatEvent::MessageRead { .. } => "MESSAGE_READ",
            ChatEvent::UserTyping { .. } => "USER_TYPING",
        }
    }

    pub fn room_id(&self) -> &str {
        match self {
            ChatEvent::NewMessage { room_id, .. }
            | ChatEvent::MessageRead { room_id, .. }
            | ChatEvent::UserTyping { room_id, .. } => room_id,
        }
    }
}
