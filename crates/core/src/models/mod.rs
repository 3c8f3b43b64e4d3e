//! Data models for chat rooms, messages and identities

mod event;
mod message;
mod room;
mod user;

pub use event::*;
pub use message::*;
pub use room::*;
pub use user::*;
