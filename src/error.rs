//! Error types for pubsub-client.

use thiserror::Error;

/// Main error type for all pubsub operations.
#[derive(Debug, Error)]
pub enum PubsubError {
    /// Failed to open the stream to the broker.
    #[error("failed to connect to broker at {path}: {source}")]
    Connect {
        /// Socket path the connection attempt targeted.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// Operation attempted while disconnected.
    #[error("not connected to broker")]
    NotConnected,

    /// `connect` called on a client that already holds a live connection.
    #[error("already connected to broker")]
    AlreadyConnected,

    /// Topic plus separator alone exceeds the command payload budget.
    #[error("topic too long: {len} bytes leaves no room in the {max}-byte payload")]
    TopicTooLong {
        /// Byte length of the offending topic.
        len: usize,
        /// Maximum combined `topic|message` payload length.
        max: usize,
    },

    /// Malformed filter binary layout on deserialize.
    #[error("malformed filter payload: {0}")]
    FilterFormat(String),

    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using PubsubError.
pub type Result<T> = std::result::Result<T, PubsubError>;
