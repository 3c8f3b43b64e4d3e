//! Tabchat Bus Library
//!
//! In-process broadcast transport that lets every open tab of one profile
//! see the chat events the others publish.
//!
//! # Architecture
//!
//! - **Hub**: owns the named channels, one per channel name
//! - **Bus**: one tab's handle on a channel, tagged with a random origin
//! - **Protocol**: JSON `{type, data}` frames
//!
//! # Usage
//!
//! ```ignore
//! let hub = BusHub::default();
//! let bus = hub.open("chat_channel")?;
//! let chat = ChatService::new(&config, store, Box::new(bus), auth);
//!
//! // Once per event-loop turn
//! chat.process_bus_events();
//! ```

pub mod error;
pub mod hub;
pub mod protocol;

pub use error::{Error, Result};
pub use hub::{BroadcastBus, BusHub};
pub use protocol::{decode_event, encode_event, Frame, MAX_EVENT_SIZE};
