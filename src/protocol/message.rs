//! Inbound message decoding.
//!
//! The broker delivers messages as `MSG <topic>|<payload>` frames. Anything
//! that does not match that shape - wrong prefix, missing separator, invalid
//! UTF-8 - is not a protocol violation from the client's point of view: the
//! decoder returns `None` and the caller skips the frame.

/// Frame prefix for broker-delivered messages.
pub const MESSAGE_PREFIX: &[u8] = b"MSG ";

/// A decoded broker message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Topic the message was routed on.
    pub topic: String,
    /// Message payload.
    pub payload: String,
}

impl Message {
    /// Decode a frame into a message.
    ///
    /// Recognizes `MSG <topic>|<payload>`, splitting on the first `|`.
    /// Returns `None` for any frame that does not match - non-matching frames
    /// are silently ignored, not errors.
    pub fn decode(frame: &[u8]) -> Option<Self> {
        let body = frame.strip_prefix(MESSAGE_PREFIX)?;
        let body = std::str::from_utf8(body).ok()?;
        let (topic, payload) = body.split_once('|')?;

        Some(Self {
            topic: topic.to_string(),
            payload: payload.to_string(),
        })
    }
}
