//! # pubsub-client
//!
//! Rust client SDK for the pubsub broker daemon.
//!
//! This crate maintains a persistent connection to the broker, announces
//! topic interest with a compact Bloom filter, publishes messages under the
//! broker's payload budget, and dispatches inbound messages to registered
//! callbacks.
//!
//! ## Architecture
//!
//! - **Filter**: exact topic set + Bloom summary shipped to the broker
//!   (`SUB` command) so it can route without topic strings
//! - **Protocol**: ASCII commands out (`PUB`, `SUB`), newline-delimited
//!   `MSG` frames in
//! - **Client**: writer task for serialized writes, reader task feeding a
//!   bounded channel, dispatch task invoking callbacks
//!
//! ## Example
//!
//! ```ignore
//! use pubsub_client::PubsubClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut client = PubsubClient::new("/tmp/pubsub.sock");
//!     client.connect().await.unwrap();
//!
//!     client
//!         .subscribe("sensors/temperature", |payload| async move {
//!             println!("reading: {payload}");
//!             Ok(())
//!         })
//!         .await
//!         .unwrap();
//!
//!     client.publish("devices/light", "on").await.unwrap();
//! }
//! ```

pub mod error;
pub mod filter;
pub mod protocol;
pub mod subscription;
pub mod transport;

mod client;
mod writer;

pub use client::{ClientBuilder, ConnectionState, PubsubClient};
pub use error::{PubsubError, Result};
pub use filter::TopicFilter;
pub use protocol::Message;
pub use subscription::CallbackResult;
