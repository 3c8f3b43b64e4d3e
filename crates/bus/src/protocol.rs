//! Wire format for bus events
//!
//! Events are JSON documents of the form `{"type": ..., "data": ...}`.
//! Maximum payload size: 256 KiB (sanity limit)

use std::sync::Arc;

use tabchat_core::ChatEvent;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Maximum allowed encoded event size (256 KiB)
pub const MAX_EVENT_SIZE: usize = 256 * 1024;

/// One posted event as carried on a channel
#[derive(Debug, Clone)]
pub struct Frame {
    /// Handle that posted the frame
    pub origin: Uuid,
    pub payload: Arc<[u8]>,
}

/// Serialize an event to its JSON wire form
pub fn encode_event(event: &ChatEvent) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(event)
        .map_err(|e| Error::Protocol(format!("Serialization failed: {}", e)))?;

    if payload.len() > MAX_EVENT_SIZE {
        return Err(Error::Protocol(format!(
            "Event too large: {} bytes (max {})",
            payload.len(),
            MAX_EVENT_SIZE
        )));
    }
    Ok(payload)
}

/// Parse an event from its JSON wire form
pub fn decode_event(bytes: &[u8]) -> Result<ChatEvent> {
    if bytes.is_empty() {
        return Err(Error::Protocol("Empty frame".into()));
    }
    if bytes.len() > MAX_EVENT_SIZE {
        return Err(Error::Protocol(format!(
            "Frame too large: {} bytes (max {})",
            bytes.len(),
            MAX_EVENT_SIZE
        )));
    }
    serde_json::from_slice(bytes).map_err(|e| Error::Protocol(format!("Invalid event: {}", e)))
}
