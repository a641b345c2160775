//! Outbound command encoding.
//!
//! Commands are ASCII-prefixed byte strings addressed to the broker:
//!
//! ```text
//! PUB <topic>|<message>     payload capped at 61 bytes
//! SUB <filter-bytes>        binary filter image from the filter module
//! ```
//!
//! The broker relays publish payloads in fixed 64-byte packets (3 bytes of
//! packet header + 61 bytes of payload), which is where the payload budget
//! comes from. Oversized messages are truncated to fit; the topic is never
//! truncated - a topic that cannot fit alongside an empty message is an error.

use bytes::Bytes;

use crate::error::{PubsubError, Result};
use crate::filter::TopicFilter;

/// Maximum combined `topic|message` payload length in bytes.
pub const MAX_COMMAND_PAYLOAD: usize = 61;

/// Publish command prefix.
pub const PUBLISH_PREFIX: &[u8] = b"PUB ";

/// Subscribe command prefix.
pub const SUBSCRIBE_PREFIX: &[u8] = b"SUB ";

/// Encode a `PUB` command.
///
/// If `topic|message` exceeds [`MAX_COMMAND_PAYLOAD`], the message is
/// truncated (on a char boundary) so the payload fits the budget exactly.
///
/// # Errors
///
/// [`PubsubError::TopicTooLong`] when the topic plus separator alone reaches
/// the budget - truncation can never shorten the topic.
pub fn encode_publish(topic: &str, message: &str) -> Result<Bytes> {
    let topic_and_sep = topic.len() + 1;
    if topic_and_sep >= MAX_COMMAND_PAYLOAD {
        return Err(PubsubError::TopicTooLong {
            len: topic.len(),
            max: MAX_COMMAND_PAYLOAD,
        });
    }

    let budget = MAX_COMMAND_PAYLOAD - topic_and_sep;
    let message = truncate_to_boundary(message, budget);

    let mut out = Vec::with_capacity(PUBLISH_PREFIX.len() + topic_and_sep + message.len());
    out.extend_from_slice(PUBLISH_PREFIX);
    out.extend_from_slice(topic.as_bytes());
    out.push(b'|');
    out.extend_from_slice(message.as_bytes());
    Ok(Bytes::from(out))
}

/// Encode a `SUB` command carrying a serialized filter.
pub fn encode_subscribe(filter_bytes: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(SUBSCRIBE_PREFIX.len() + filter_bytes.len());
    out.extend_from_slice(SUBSCRIBE_PREFIX);
    out.extend_from_slice(filter_bytes);
    Bytes::from(out)
}

/// Build a one-shot `SUB` command for a list of topics.
///
/// Convenience for senders that do not hold a long-lived client: constructs a
/// default-sized filter, adds each topic, and encodes the subscribe command.
pub fn encode_subscribe_topics<I, S>(topics: I) -> Bytes
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut filter = TopicFilter::new();
    for topic in topics {
        filter.add_topic(topic.as_ref());
    }
    encode_subscribe(&filter.serialize())
}

/// Truncate to at most `max_bytes`, backing up to the nearest char boundary.
fn truncate_to_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
