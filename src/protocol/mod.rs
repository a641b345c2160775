//! Protocol module - command encoding, framing, and message decoding.
//!
//! This module implements the text wire protocol:
//! - `PUB`/`SUB` command encoding with the payload budget
//! - Frame buffer for accumulating partial reads
//! - `MSG` frame decoding

mod command;
mod frame_buffer;
mod message;

pub use command::{
    encode_publish, encode_subscribe, encode_subscribe_topics, MAX_COMMAND_PAYLOAD,
    PUBLISH_PREFIX, SUBSCRIBE_PREFIX,
};
pub use frame_buffer::{FrameBuffer, FRAME_FALLBACK_THRESHOLD};
pub use message::{Message, MESSAGE_PREFIX};
