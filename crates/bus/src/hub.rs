//! Broadcast hub and per-tab bus handles
//!
//! Each channel name maps to one `tokio::sync::broadcast` channel. Every
//! handle subscribes on open and filters out its own frames, so a tab
//! never sees its own events. Delivery is at most once: a handle that
//! falls more than `capacity` frames behind loses the oldest ones.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tabchat_core::config::DEFAULT_BUS_CAPACITY;
use tabchat_core::{ChatEvent, EventBus};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::protocol::{decode_event, encode_event, Frame};

struct HubState {
    channels: HashMap<String, broadcast::Sender<Frame>>,
    shut_down: bool,
}

/// Shared registry of named channels. Clones share the same channels.
#[derive(Clone)]
pub struct BusHub {
    state: Arc<Mutex<HubState>>,
    capacity: usize,
}

impl BusHub {
    /// Create a hub whose channels buffer up to `capacity` frames per handle
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(HubState {
                channels: HashMap::new(),
                shut_down: false,
            })),
            capacity: capacity.max(1),
        }
    }

    /// Open a handle on `channel`, creating the channel on first use
    pub fn open(&self, channel: &str) -> Result<BroadcastBus> {
        if channel.trim().is_empty() {
            return Err(Error::InvalidChannel(channel.to_string()));
        }

        let mut state = self.lock();
        if state.shut_down {
            return Err(Error::HubShutdown);
        }

        let capacity = self.capacity;
        let tx = state
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| {
                debug!(channel, capacity, "Creating bus channel");
                broadcast::channel(capacity).0
            })
            .clone();
        let rx = tx.subscribe();
        let origin = Uuid::new_v4();

        info!(channel, origin = %origin, "Opened bus handle");
        Ok(BroadcastBus {
            origin,
            channel: channel.to_string(),
            tx,
            rx: Mutex::new(Some(rx)),
        })
    }

    /// Number of open handles on `channel`
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.lock()
            .channels
            .get(channel)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Refuse further opens. Handles already open keep working.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.shut_down = true;
        state.channels.clear();
        info!("Bus hub shut down");
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BusHub {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

/// One tab's handle on a channel
pub struct BroadcastBus {
    origin: Uuid,
    channel: String,
    tx: broadcast::Sender<Frame>,
    rx: Mutex<Option<broadcast::Receiver<Frame>>>,
}

impl BroadcastBus {
    pub fn origin(&self) -> Uuid {
        self.origin
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_closed(&self) -> bool {
        self.lock_rx().is_none()
    }

    /// Post an already-encoded payload, as other code sharing the channel
    /// might. Receivers decode it like any other frame.
    pub fn post_raw(&self, payload: Vec<u8>) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        let frame = Frame {
            origin: self.origin,
            payload: payload.into(),
        };
        let receivers = self.tx.send(frame).map_err(|_| Error::Closed)?;
        trace!(channel = %self.channel, receivers, "Posted frame");
        Ok(())
    }

    fn lock_rx(&self) -> MutexGuard<'_, Option<broadcast::Receiver<Frame>>> {
        self.rx.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventBus for BroadcastBus {
    fn publish(&self, event: &ChatEvent) -> tabchat_core::Result<()> {
        let payload = encode_event(event)?;
        self.post_raw(payload)?;
        debug!(channel = %self.channel, kind = event.kind(), room_id = event.room_id(), "Published event");
        Ok(())
    }

    fn drain(&self) -> Vec<ChatEvent> {
        let mut guard = self.lock_rx();
        let Some(rx) = guard.as_mut() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(frame) => {
                    if frame.origin == self.origin {
                        continue;
                    }
                    match decode_event(&frame.payload) {
                        Ok(event) => events.push(event),
                        Err(e) => {
                            warn!(channel = %self.channel, from = %frame.origin, error = %e, "Dropping undecodable frame");
                        }
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(channel = %self.channel, skipped, "Bus handle fell behind, events lost");
                }
            }
        }
        events
    }

    fn close(&self) {
        if self.lock_rx().take().is_some() {
            info!(channel = %self.channel, origin = %self.origin, "Closed bus handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_event(room: &str) -> ChatEvent {
        ChatEvent::MessageRead {
            room_id: room.into(),
            message_id: "m1".into(),
        }
    }

    #[test]
    fn test_own_events_not_echoed() {
        let hub = BusHub::default();
        let a = hub.open("chat").unwrap();
        let b = hub.open("chat").unwrap();

        a.publish(&read_event("r1")).unwrap();
        assert!(a.drain().is_empty());
        assert_eq!(b.drain(), vec![read_event("r1")]);
        assert!(b.drain().is_empty());
    }

    #[test]
    fn test_order_preserved_per_sender() {
        let hub = BusHub::default();
        let a = hub.open("chat").unwrap();
        let b = hub.open("chat").unwrap();
        for room in ["r1", "r2", "r3"] {
            a.publish(&read_event(room)).unwrap();
        }
        let rooms: Vec<String> = b.drain().iter().map(|e| e.room_id().to_string()).collect();
        assert_eq!(rooms, vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn test_channels_are_isolated() {
        let hub = BusHub::default();
        let chat = hub.open("chat").unwrap();
        let other = hub.open("orders").unwrap();
        chat.publish(&read_event("r1")).unwrap();
        assert!(other.drain().is_empty());
    }

    #[test]
    fn test_late_opener_misses_earlier_events() {
        let hub = BusHub::default();
        let a = hub.open("chat").unwrap();
        a.publish(&read_event("r1")).unwrap();
        let late = hub.open("chat").unwrap();
        assert!(late.drain().is_empty());
    }

    #[test]
    fn test_lagging_handle_loses_oldest() {
        let hub = BusHub::new(2);
        let a = hub.open("chat").unwrap();
        let b = hub.open("chat").unwrap();
        for room in ["r1", "r2", "r3", "r4"] {
            a.publish(&read_event(room)).unwrap();
        }
        let rooms: Vec<String> = b.drain().iter().map(|e| e.room_id().to_string()).collect();
        assert_eq!(rooms, vec!["r3", "r4"]);
    }

    #[test]
    fn test_garbage_frame_dropped() {
        let hub = BusHub::default();
        let a = hub.open("chat").unwrap();
        let b = hub.open("chat").unwrap();
        a.post_raw(b"{\"type\":\"NOPE\"}".to_vec()).unwrap();
        a.publish(&read_event("r1")).unwrap();
        assert_eq!(b.drain(), vec![read_event("r1")]);
    }

    #[test]
    fn test_closed_handle() {
        let hub = BusHub::default();
        let a = hub.open("chat").unwrap();
        let b = hub.open("chat").unwrap();
        b.close();
        b.close();
        assert!(b.is_closed());
        assert!(b.publish(&read_event("r1")).is_err());

        a.publish(&read_event("r1")).unwrap();
        assert!(b.drain().is_empty());
        assert_eq!(hub.subscriber_count("chat"), 1);
    }

    #[test]
    fn test_open_fails_fast() {
        let hub = BusHub::default();
        assert!(matches!(hub.open("  "), Err(Error::InvalidChannel(_))));

        let open = hub.open("chat").unwrap();
        hub.shutdown();
        assert!(matches!(hub.open("chat"), Err(Error::HubShutdown)));
        assert!(open.publish(&read_event("r1")).is_ok());
    }
}
