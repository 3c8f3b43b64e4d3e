//! Chat message model

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{Identity, SenderRole};

const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a message id: `msg_<millis>_<random base36 suffix>`
pub fn generate_message_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_SUFFIX_ALPHABET[rng.gen_range(0..ID_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("msg_{}_{}", now_millis(), suffix)
}

/// A chat message in a room
///
/// Sender fields are a snapshot taken at send time. Only `is_read`
/// changes after the message has been appended to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_role: SenderRole,
    pub content: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(default)]
    pub is_read: bool,
}

impl ChatMessage {
    /// Build a new unread message from `sender`. `content` is stored as given;
    /// trimming and the empty check happen at the send boundary.
    pub fn new(sender: &Identity, content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            sender_id: sender.id().to_string(),
            sender_name: sender.display_name().to_string(),
            sender_role: sender.role(),
            content: content.into(),
            timestamp: now_millis(),
            is_read: false,
        }
    }

    pub fn is_from(&self, user_id: &str) -> bool {
        self.sender_id == user_id
    }

    /// Check a message that did not come from `new`: read back from
    /// storage or received from another tab.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidMessage("message without id".into()));
        }
        if self.content.trim().is_empty() {
            return Err(Error::InvalidMessage(format!("message {} is empty", self.id)));
        }
        Ok(())
    }
}
