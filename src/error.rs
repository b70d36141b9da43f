//! Error types for echolink.

use thiserror::Error;

/// Main error type for all echolink operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// I/O error during transport reads/writes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port open/configure error.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Payload does not match the configured frame geometry.
    #[error("invalid payload length: expected {expected} bytes, got {actual}")]
    InvalidPayloadLength { expected: usize, actual: usize },

    /// Invalid configuration (frame geometry, expected-value set, etc.).
    #[error("configuration error: {0}")]
    Config(String),

    /// The receive loop terminated on a transport failure.
    #[error("receiver stopped: {0}")]
    ReceiverStopped(String),
}

/// Result type alias using LinkError.
pub type Result<T> = std::result::Result<T, LinkError>;
