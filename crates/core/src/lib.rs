//! Tabchat Core Library
//!
//! Room/message models, profile storage, the room registry, listener
//! fan-out and the chat service that ties them together. The cross-tab
//! transport plugs in through [`EventBus`].

pub mod config;
pub mod error;
pub mod identity;
pub mod invariants;
pub mod listeners;
pub mod models;
pub mod registry;
pub mod service;
pub mod storage;
pub mod transport;

pub use config::ChatConfig;
pub use error::{Error, Result};
pub use identity::{Anonymous, AuthProvider, UserResolver};
pub use listeners::Subscription;
pub use models::*;
pub use registry::RoomRegistry;
pub use service::ChatService;
pub use storage::{Database, KeyValueStore, MemoryStore, RoomStore, SnapshotPolicy};
pub use transport::EventBus;
