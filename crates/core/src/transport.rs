//! Cross-tab event transport interface
//!
//! Implementations deliver events to every other tab listening on the
//! same channel. Delivery is best effort and at most once; a tab never
//! receives its own events.

use crate::error::Result;
use crate::models::ChatEvent;

pub trait EventBus: Send + Sync {
    /// Post an event to the other tabs
    fn publish(&self, event: &ChatEvent) -> Result<()>;

    /// Take the events delivered to this tab since the last call, in order
    fn drain(&self) -> Vec<ChatEvent>;

    /// Release the channel handle; later publishes fail and drains are empty
    fn close(&self);
}
