//! Bus error types

/// Bus result type
pub type Result<T> = std::result::Result<T, Error>;

/// Bus errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid channel name: {0:?}")]
    InvalidChannel(String),

    #[error("Bus hub has been shut down")]
    HubShutdown,

    #[error("Bus handle closed")]
    Closed,
}

impl From<Error> for tabchat_core::Error {
    fn from(e: Error) -> Self {
        tabchat_core::Error::Bus(e.to_string())
    }
}
