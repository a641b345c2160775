//! Subscription table for dispatching messages by topic.
//!
//! Maps topic names to callbacks. Each topic holds exactly one callback;
//! re-subscribing to a topic replaces the previous callback (last-write-wins).
//!
//! # Example
//!
//! ```
//! use pubsub_client::subscription::SubscriptionTable;
//!
//! let mut table = SubscriptionTable::new();
//! table.register("sensors/temperature", |payload| async move {
//!     println!("reading: {payload}");
//!     Ok(())
//! });
//! assert!(table.contains("sensors/temperature"));
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::Result;

/// Result type for callbacks.
pub type CallbackResult = Result<()>;

/// Boxed future for callback results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for topic callbacks.
///
/// Implemented automatically for any `Fn(String) -> impl Future` via
/// [`FnCallback`]; a manual implementation is only needed for callbacks that
/// carry non-closure state.
pub trait TopicCallback: Send + Sync + 'static {
    /// Handle one delivered payload.
    fn call(&self, payload: String) -> BoxFuture<'static, CallbackResult>;
}

/// Wrapper turning an async closure into a [`TopicCallback`].
pub struct FnCallback<F>(F);

impl<F, Fut> TopicCallback for FnCallback<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallbackResult> + Send + 'static,
{
    fn call(&self, payload: String) -> BoxFuture<'static, CallbackResult> {
        Box::pin((self.0)(payload))
    }
}

/// Table mapping topics to their callbacks.
#[derive(Default)]
pub struct SubscriptionTable {
    /// Callbacks by topic. Arc so a callback can be cloned out of the table
    /// and invoked without holding any lock across the await.
    callbacks: HashMap<String, Arc<dyn TopicCallback>>,
}

impl SubscriptionTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    /// Register a callback for a topic, replacing any prior callback.
    ///
    /// Returns `true` if a prior callback was replaced.
    pub fn register<F, Fut>(&mut self, topic: &str, callback: F) -> bool
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.callbacks
            .insert(topic.to_string(), Arc::new(FnCallback(callback)))
            .is_some()
    }

    /// Remove the callback for a topic. Returns `true` if one was registered.
    pub fn remove(&mut self, topic: &str) -> bool {
        self.callbacks.remove(topic).is_some()
    }

    /// Get the callback for a topic, if any.
    pub fn get(&self, topic: &str) -> Option<Arc<dyn TopicCallback>> {
        self.callbacks.get(topic).cloned()
    }

    /// Whether a callback is registered for the topic.
    pub fn contains(&self, topic: &str) -> bool {
        self.callbacks.contains_key(topic)
    }

    /// Number of registered topics.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no topics are registered.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Iterate over the registered topics (unordered).
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.callbacks.keys().map(String::as_str)
    }
}
