use thiserror::Error;

/// Failures on a single client's socket. Never fatal to the hub.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer closed the connection or the stream ended.
    #[error("Connection closed")]
    Closed,

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum HubError {
    /// The hub task has stopped and no longer accepts commands.
    #[error("Hub is not running")]
    Unavailable,
}
