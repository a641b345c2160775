//! Filter module - probabilistic subscription interest.
//!
//! - [`BloomFilter`] - the approximate-membership primitive
//! - [`TopicFilter`] - exact topic set plus the Bloom summary shipped to the
//!   broker

mod bloom;
mod topic;

pub use bloom::{optimal_params, BloomFilter};
pub use topic::{
    TopicFilter, DEFAULT_CAPACITY, DEFAULT_FALSE_POSITIVE_RATE, FILTER_HEADER_SIZE,
};
