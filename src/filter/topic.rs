//! Topic filter - exact topic set plus a Bloom summary of it.
//!
//! The exact `HashSet` is the authoritative membership record; the Bloom
//! filter is a derived, compact summary that gets shipped to the broker so it
//! can route without knowing topic strings. The two are kept in sync by
//! construction: every mutation goes through [`TopicFilter::add_topic`],
//! [`TopicFilter::remove_topic`] or [`TopicFilter::clear`].
//!
//! Bloom filters cannot delete in place without risking false negatives, so
//! removal rebuilds the summary from the remaining topics. The rebuild is an
//! explicit O(n) step rather than an in-place mutation, which keeps its cost
//! visible and testable.
//!
//! # Wire layout
//!
//! ```text
//! ┌────────────┬────────────┬──────────────────┐
//! │ bit length │ hash count │ bit array        │
//! │ u32 BE     │ u32 BE     │ ceil(bits/8) B   │
//! └────────────┴────────────┴──────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::{PubsubError, Result};
use crate::filter::bloom::BloomFilter;

/// Default expected topic capacity.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default target false-positive rate.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Serialized header size: bit length (u32 BE) + hash count (u32 BE).
pub const FILTER_HEADER_SIZE: usize = 8;

/// Subscribed-topic set with a transmittable Bloom summary.
#[derive(Debug, Clone)]
pub struct TopicFilter {
    /// Exact subscribed topics - source of truth for membership.
    topics: HashSet<String>,
    /// Bloom summary derived from `topics`.
    bloom: BloomFilter,
    /// Sizing kept for rebuilds.
    capacity: usize,
    target_fpr: f64,
}

impl TopicFilter {
    /// Create an empty filter with the default sizing (1000 topics at 1% FPR).
    pub fn new() -> Self {
        Self::with_params(DEFAULT_CAPACITY, DEFAULT_FALSE_POSITIVE_RATE)
    }

    /// Create an empty filter sized for `capacity` topics at `target_fpr`.
    pub fn with_params(capacity: usize, target_fpr: f64) -> Self {
        Self {
            topics: HashSet::new(),
            bloom: BloomFilter::with_capacity(capacity, target_fpr),
            capacity,
            target_fpr,
        }
    }

    /// Add a topic. Idempotent: re-adding a present topic changes nothing.
    pub fn add_topic(&mut self, topic: &str) {
        if self.topics.insert(topic.to_string()) {
            self.bloom.insert(topic.as_bytes());
        }
    }

    /// Remove a topic. No-op if absent; otherwise the Bloom summary is fully
    /// rebuilt from the remaining topics.
    pub fn remove_topic(&mut self, topic: &str) {
        if self.topics.remove(topic) {
            self.rebuild();
        }
    }

    /// Rebuild the Bloom summary from the exact set.
    fn rebuild(&mut self) {
        let mut bloom = BloomFilter::with_capacity(self.capacity, self.target_fpr);
        for topic in &self.topics {
            bloom.insert(topic.as_bytes());
        }
        self.bloom = bloom;
    }

    /// Approximate membership: never a false negative for a present topic,
    /// possibly a false positive for an absent one.
    ///
    /// For local dispatch decisions use [`TopicFilter::contains_exact`]
    /// instead - the two answer different questions.
    pub fn test(&self, topic: &str) -> bool {
        self.bloom.contains(topic.as_bytes())
    }

    /// Exact membership in the subscribed set.
    pub fn contains_exact(&self, topic: &str) -> bool {
        self.topics.contains(topic)
    }

    /// Serialize to the wire layout: 8-byte header + raw bit array.
    pub fn serialize(&self) -> Vec<u8> {
        let bits = self.bloom.as_raw_bytes();
        let mut out = Vec::with_capacity(FILTER_HEADER_SIZE + bits.len());
        out.extend_from_slice(&self.bloom.bit_len().to_be_bytes());
        out.extend_from_slice(&self.bloom.hash_count().to_be_bytes());
        out.extend_from_slice(bits);
        out
    }

    /// Reconstruct a filter whose Bloom summary matches the transmitted bits.
    ///
    /// The exact topic set is not recoverable from this format - the summary
    /// is lossy - so the reconstructed filter reports no exact members.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        if data.len() < FILTER_HEADER_SIZE {
            return Err(PubsubError::FilterFormat(format!(
                "need at least {FILTER_HEADER_SIZE} header bytes, got {}",
                data.len()
            )));
        }

        let bit_len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let hash_count = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);

        let body = &data[FILTER_HEADER_SIZE..];
        let expected = (bit_len as usize).div_ceil(8);
        if body.len() != expected {
            return Err(PubsubError::FilterFormat(format!(
                "bit array of {bit_len} bits needs {expected} bytes, got {}",
                body.len()
            )));
        }

        Ok(Self {
            topics: HashSet::new(),
            bloom: BloomFilter::from_raw_parts(bit_len, hash_count, body),
            capacity: DEFAULT_CAPACITY,
            target_fpr: DEFAULT_FALSE_POSITIVE_RATE,
        })
    }

    /// Reset both the exact set and the Bloom summary.
    pub fn clear(&mut self) {
        self.topics.clear();
        self.bloom.clear();
    }

    /// Iterate over the exactly-subscribed topics (unordered).
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(String::as_str)
    }

    /// Number of exactly-subscribed topics.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether no topics are subscribed.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// The underlying Bloom summary.
    pub fn bloom(&self) -> &BloomFilter {
        &self.bloom
    }
}

impl Default for TopicFilter {
    fn default() -> Self {
        Self::new()
    }
}
