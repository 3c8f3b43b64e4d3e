//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::models::ChatRoom;

/// Validate that a room's cached fields agree with its message log
pub fn assert_room_invariants(room: &ChatRoom) {
    debug_assert!(
        room.last_message.as_ref() == room.messages.last(),
        "Room {} last_message is out of sync with its message log",
        room.id
    );
}
