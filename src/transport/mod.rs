//! Transport module - platform-specific socket handling.
//!
//! Provides abstraction over:
//! - Unix Domain Sockets (Linux/macOS)
//! - Named Pipes (Windows)

mod socket;

pub use socket::{BrokerStream, DEFAULT_SOCKET_PATH};
