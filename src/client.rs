//! Client builder and runtime loops.
//!
//! The [`ClientBuilder`] provides a fluent API for configuring the client.
//! The [`PubsubClient`] manages the lifecycle:
//! 1. Connect to the broker socket
//! 2. Spawn the writer, reader, and dispatch tasks
//! 3. Push filter updates on subscribe/unsubscribe
//! 4. Deliver inbound messages to topic callbacks
//!
//! # Example
//!
//! ```ignore
//! use pubsub_client::PubsubClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = PubsubClient::new("/tmp/pubsub.sock");
//!     client.connect().await?;
//!
//!     client
//!         .subscribe("sensors/temperature", |payload| async move {
//!             println!("reading: {payload}");
//!             Ok(())
//!         })
//!         .await?;
//!
//!     client.publish("devices/light", "on").await?;
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::error::{PubsubError, Result};
use crate::filter::{TopicFilter, DEFAULT_CAPACITY, DEFAULT_FALSE_POSITIVE_RATE};
use crate::protocol::{encode_publish, encode_subscribe, FrameBuffer, Message};
use crate::subscription::{CallbackResult, SubscriptionTable};
use crate::transport::{BrokerStream, DEFAULT_SOCKET_PATH};
use crate::writer::{spawn_writer_task, WriterHandle, DEFAULT_WRITER_CAPACITY};

/// Default read buffer size for the reader task.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4 * 1024;

/// Default capacity of the decoded-message channel.
pub const DEFAULT_DISPATCH_CAPACITY: usize = 256;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// No live connection.
    Disconnected = 0,
    /// `connect` is opening the stream.
    Connecting = 1,
    /// Stream open, background tasks running.
    Connected = 2,
}

/// Connection state shared with the reader task.
///
/// The reader polls it for cooperative exit and records peer-initiated
/// closure; the foreground flips it on connect/disconnect.
#[derive(Debug)]
struct SharedState(AtomicU8);

impl SharedState {
    fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    fn get(&self) -> ConnectionState {
        match self.0.load(Ordering::Acquire) {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }

    fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Builder for configuring and creating a pubsub client.
pub struct ClientBuilder {
    socket_path: String,
    filter_capacity: usize,
    filter_fpr: f64,
    read_buffer_size: usize,
    writer_capacity: usize,
    dispatch_capacity: usize,
}

impl ClientBuilder {
    /// Create a new client builder with default settings.
    pub fn new() -> Self {
        Self {
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            filter_capacity: DEFAULT_CAPACITY,
            filter_fpr: DEFAULT_FALSE_POSITIVE_RATE,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            writer_capacity: DEFAULT_WRITER_CAPACITY,
            dispatch_capacity: DEFAULT_DISPATCH_CAPACITY,
        }
    }

    /// Set the broker socket path.
    ///
    /// Default: [`DEFAULT_SOCKET_PATH`].
    pub fn socket_path(mut self, path: impl Into<String>) -> Self {
        self.socket_path = path.into();
        self
    }

    /// Set the expected topic capacity of the subscription filter.
    ///
    /// Default: 1000.
    pub fn filter_capacity(mut self, capacity: usize) -> Self {
        self.filter_capacity = capacity;
        self
    }

    /// Set the target false-positive rate of the subscription filter.
    ///
    /// Default: 0.01.
    pub fn filter_false_positive_rate(mut self, fpr: f64) -> Self {
        self.filter_fpr = fpr;
        self
    }

    /// Set the reader task's chunk buffer size.
    ///
    /// Default: 4 KiB.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the outbound command channel capacity.
    ///
    /// Default: 64.
    pub fn writer_capacity(mut self, capacity: usize) -> Self {
        self.writer_capacity = capacity;
        self
    }

    /// Set the decoded-message channel capacity.
    ///
    /// Default: 256.
    pub fn dispatch_capacity(mut self, capacity: usize) -> Self {
        self.dispatch_capacity = capacity;
        self
    }

    /// Build the client. The client starts disconnected; call
    /// [`PubsubClient::connect`] to open the stream.
    pub fn build(self) -> PubsubClient {
        PubsubClient {
            filter: TopicFilter::with_params(self.filter_capacity, self.filter_fpr),
            socket_path: self.socket_path,
            read_buffer_size: self.read_buffer_size,
            writer_capacity: self.writer_capacity,
            dispatch_capacity: self.dispatch_capacity,
            state: Arc::new(SharedState::new(ConnectionState::Disconnected)),
            subscriptions: Arc::new(RwLock::new(SubscriptionTable::new())),
            writer: None,
            reader_task: None,
            dispatch_task: None,
            writer_task: None,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the pubsub broker daemon.
///
/// Holds the connection state machine, the subscription table, and the topic
/// filter. All writes go through a dedicated writer task; inbound messages
/// flow reader task -> bounded channel -> dispatch task -> callback.
pub struct PubsubClient {
    /// Broker socket path.
    socket_path: String,
    read_buffer_size: usize,
    writer_capacity: usize,
    dispatch_capacity: usize,
    /// Connection state, shared with the reader task.
    state: Arc<SharedState>,
    /// Topic -> callback, shared with the dispatch task.
    subscriptions: Arc<RwLock<SubscriptionTable>>,
    /// Subscription interest, mutated only by subscribe/unsubscribe.
    filter: TopicFilter,
    /// Handle for queueing outbound commands.
    writer: Option<WriterHandle>,
    reader_task: Option<JoinHandle<()>>,
    dispatch_task: Option<JoinHandle<()>>,
    writer_task: Option<JoinHandle<Result<()>>>,
}

impl PubsubClient {
    /// Create a client targeting `socket_path` with default settings.
    pub fn new(socket_path: impl Into<String>) -> Self {
        ClientBuilder::new().socket_path(socket_path).build()
    }

    /// Create a client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Open the stream to the broker and start the background tasks.
    ///
    /// # Errors
    ///
    /// [`PubsubError::AlreadyConnected`] if a connection is live;
    /// [`PubsubError::Connect`] if the stream cannot be opened, in which case
    /// the state stays `Disconnected`.
    pub async fn connect(&mut self) -> Result<()> {
        if self.state.get() != ConnectionState::Disconnected {
            return Err(PubsubError::AlreadyConnected);
        }

        self.state.set(ConnectionState::Connecting);
        let stream = match BrokerStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            Err(e) => {
                self.state.set(ConnectionState::Disconnected);
                return Err(e);
            }
        };
        let (read_half, write_half) = stream.into_split();

        // Connected before the reader spawns: its loop condition checks the
        // shared state.
        self.state.set(ConnectionState::Connected);

        let (writer, writer_task) = spawn_writer_task(write_half, self.writer_capacity);
        let (message_tx, message_rx) = mpsc::channel(self.dispatch_capacity);

        let reader_task = tokio::spawn(read_loop(
            read_half,
            message_tx,
            self.state.clone(),
            self.read_buffer_size,
        ));
        let dispatch_task = tokio::spawn(dispatch_loop(message_rx, self.subscriptions.clone()));

        self.writer = Some(writer);
        self.reader_task = Some(reader_task);
        self.dispatch_task = Some(dispatch_task);
        self.writer_task = Some(writer_task);

        tracing::debug!(path = %self.socket_path, "connected to broker");
        Ok(())
    }

    /// Close the connection and stop the background tasks.
    ///
    /// Sets the state to `Disconnected` first so the reader exits
    /// cooperatively, cancels it and awaits completion (the cancellation
    /// itself is expected and suppressed), then lets the writer drain, flush,
    /// and shut the stream down. No-op when already disconnected.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.state.set(ConnectionState::Disconnected);

        if let Some(task) = self.reader_task.take() {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::error!("reader task failed: {e}");
                }
            }
        }

        // The reader owned the message sender; the dispatch task drains the
        // channel and exits on its own.
        if let Some(task) = self.dispatch_task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::error!("dispatch task failed: {e}");
                }
            }
        }

        // Dropping the last handle closes the command channel; the writer
        // flushes and shuts the stream down before exiting.
        self.writer = None;
        if let Some(task) = self.writer_task.take() {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!("writer exited with error: {e}"),
                Err(e) => {
                    if !e.is_cancelled() {
                        tracing::error!("writer task failed: {e}");
                    }
                }
            }
        }

        tracing::debug!("disconnected from broker");
        Ok(())
    }

    /// Publish a message to a topic.
    ///
    /// # Errors
    ///
    /// [`PubsubError::NotConnected`] while disconnected;
    /// [`PubsubError::TopicTooLong`] if the topic cannot fit the command
    /// payload budget (the message is never sent).
    pub async fn publish(&self, topic: &str, message: &str) -> Result<()> {
        let writer = self.writer()?;
        let command = encode_publish(topic, message)?;
        writer.send(command).await
    }

    /// Subscribe to a topic.
    ///
    /// Registers the callback (replacing any prior callback for the same
    /// topic), records the topic in the filter, and pushes the freshly
    /// serialized filter to the broker.
    ///
    /// # Errors
    ///
    /// [`PubsubError::NotConnected`] while disconnected.
    pub async fn subscribe<F, Fut>(&mut self, topic: &str, callback: F) -> Result<()>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.writer()?;

        let replaced = self.subscriptions.write().await.register(topic, callback);
        if replaced {
            tracing::debug!(topic, "replaced existing subscription callback");
        }
        self.filter.add_topic(topic);
        self.send_filter().await
    }

    /// Unsubscribe from a topic.
    ///
    /// No-op for a topic without a subscription. Otherwise removes the
    /// callback, removes the topic from the filter (rebuilding it), and
    /// re-sends the filter to the broker.
    pub async fn unsubscribe(&mut self, topic: &str) -> Result<()> {
        if !self.subscriptions.read().await.contains(topic) {
            return Ok(());
        }
        self.writer()?;

        self.subscriptions.write().await.remove(topic);
        self.filter.remove_topic(topic);
        self.send_filter().await
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Whether the client holds a live connection.
    pub fn is_connected(&self) -> bool {
        self.state.get() == ConnectionState::Connected
    }

    /// The client's topic filter.
    pub fn filter(&self) -> &TopicFilter {
        &self.filter
    }

    /// Topics with a registered callback.
    pub async fn subscribed_topics(&self) -> Vec<String> {
        self.subscriptions
            .read()
            .await
            .topics()
            .map(str::to_string)
            .collect()
    }

    /// Number of registered subscriptions.
    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// Serialize the filter and queue the `SUB` command.
    async fn send_filter(&self) -> Result<()> {
        let command = encode_subscribe(&self.filter.serialize());
        self.writer()?.send(command).await
    }

    /// The writer handle, or `NotConnected` while disconnected.
    fn writer(&self) -> Result<&WriterHandle> {
        if self.state.get() != ConnectionState::Connected {
            return Err(PubsubError::NotConnected);
        }
        self.writer.as_ref().ok_or(PubsubError::NotConnected)
    }
}

/// Reader task: reads chunks, extracts frames, decodes messages, and feeds
/// the dispatch channel. Runs until disconnect or stream closure.
async fn read_loop<R>(
    mut reader: R,
    messages: mpsc::Sender<Message>,
    state: Arc<SharedState>,
    buffer_size: usize,
) where
    R: AsyncRead + Unpin,
{
    let mut frames = FrameBuffer::new();
    let mut buf = vec![0u8; buffer_size];

    while state.get() == ConnectionState::Connected {
        let n = match reader.read(&mut buf).await {
            // Zero-length read: peer closed the stream, expected termination.
            Ok(0) => {
                tracing::debug!("broker closed the connection");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                // After disconnect() the error is a side effect of teardown.
                if state.get() == ConnectionState::Connected {
                    tracing::error!("read error: {e}");
                }
                break;
            }
        };

        for frame in frames.push(&buf[..n]) {
            match Message::decode(&frame) {
                Some(message) => {
                    if messages.send(message).await.is_err() {
                        // Dispatch side gone; nothing left to deliver to.
                        return;
                    }
                }
                None => tracing::debug!(len = frame.len(), "ignoring unrecognized frame"),
            }
        }
    }

    state.set(ConnectionState::Disconnected);
}

/// Dispatch task: consumes decoded messages and invokes topic callbacks.
///
/// Callback failures are logged and skipped - one bad callback cannot
/// terminate the loop or affect other topics.
async fn dispatch_loop(
    mut messages: mpsc::Receiver<Message>,
    subscriptions: Arc<RwLock<SubscriptionTable>>,
) {
    while let Some(message) = messages.recv().await {
        let callback = subscriptions.read().await.get(&message.topic);
        match callback {
            Some(callback) => {
                if let Err(e) = callback.call(message.payload).await {
                    tracing::warn!(topic = %message.topic, "callback failed: {e}");
                }
            }
            None => {
                tracing::debug!(topic = %message.topic, "message for topic without a subscription")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new();

        assert_eq!(builder.socket_path, DEFAULT_SOCKET_PATH);
        assert_eq!(builder.filter_capacity, DEFAULT_CAPACITY);
        assert_eq!(builder.filter_fpr, DEFAULT_FALSE_POSITIVE_RATE);
        assert_eq!(builder.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
        assert_eq!(builder.writer_capacity, DEFAULT_WRITER_CAPACITY);
        assert_eq!(builder.dispatch_capacity, DEFAULT_DISPATCH_CAPACITY);
    }

    #[test]
    fn test_builder_configuration() {
        let builder = PubsubClient::builder()
            .socket_path("/tmp/other.sock")
            .filter_capacity(50)
            .filter_false_positive_rate(0.001)
            .read_buffer_size(512)
            .writer_capacity(8)
            .dispatch_capacity(16);

        assert_eq!(builder.socket_path, "/tmp/other.sock");
        assert_eq!(builder.filter_capacity, 50);
        assert_eq!(builder.filter_fpr, 0.001);
        assert_eq!(builder.read_buffer_size, 512);
        assert_eq!(builder.writer_capacity, 8);
        assert_eq!(builder.dispatch_capacity, 16);
    }

    #[test]
    fn test_new_client_is_disconnected() {
        let client = PubsubClient::new("/tmp/nowhere.sock");

        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(!client.is_connected());
        assert!(client.filter().is_empty());
    }

    #[tokio::test]
    async fn test_publish_while_disconnected() {
        let client = PubsubClient::new("/tmp/nowhere.sock");

        let result = client.publish("t", "m").await;

        assert!(matches!(result, Err(PubsubError::NotConnected)));
    }

    #[tokio::test]
    async fn test_subscribe_while_disconnected() {
        let mut client = PubsubClient::new("/tmp/nowhere.sock");

        let result = client.subscribe("t", |_payload| async { Ok(()) }).await;

        assert!(matches!(result, Err(PubsubError::NotConnected)));
        assert_eq!(client.subscription_count().await, 0);
        assert!(client.filter().is_empty());
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_topic_is_noop() {
        let mut client = PubsubClient::new("/tmp/nowhere.sock");

        // No subscription, no connection: still Ok.
        assert!(client.unsubscribe("t").await.is_ok());
    }

    #[tokio::test]
    async fn test_disconnect_while_disconnected_is_noop() {
        let mut client = PubsubClient::new("/tmp/nowhere.sock");

        assert!(client.disconnect().await.is_ok());
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[cfg(unix)]
    mod with_broker {
        use super::*;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::{UnixListener, UnixStream};

        /// Bind a scratch socket and return its path with the listener.
        fn scratch_broker(tag: &str) -> (String, UnixListener) {
            let path = format!("/tmp/pubsub-client-test-{}-{tag}.sock", std::process::id());
            let _ = std::fs::remove_file(&path);
            let listener = UnixListener::bind(&path).expect("bind scratch socket");
            (path, listener)
        }

        async fn connected_pair(tag: &str) -> (PubsubClient, UnixStream, String) {
            let (path, listener) = scratch_broker(tag);
            let mut client = PubsubClient::new(&path);

            let (connected, accepted) = tokio::join!(client.connect(), listener.accept());
            connected.expect("connect");
            let (broker, _) = accepted.expect("accept");

            (client, broker, path)
        }

        #[tokio::test]
        async fn test_connect_failure_leaves_disconnected() {
            let mut client = PubsubClient::new("/tmp/pubsub-client-test-absent.sock");

            let result = client.connect().await;

            assert!(matches!(result, Err(PubsubError::Connect { .. })));
            assert_eq!(client.state(), ConnectionState::Disconnected);
        }

        #[tokio::test]
        async fn test_connect_twice_fails() {
            let (mut client, _broker, path) = connected_pair("twice").await;

            let result = client.connect().await;

            assert!(matches!(result, Err(PubsubError::AlreadyConnected)));
            client.disconnect().await.unwrap();
            let _ = std::fs::remove_file(&path);
        }

        #[tokio::test]
        async fn test_publish_reaches_broker() {
            let (client, mut broker, path) = connected_pair("publish").await;

            client.publish("t", "m").await.unwrap();

            let mut buf = vec![0u8; 64];
            let n = broker.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"PUB t|m");

            let _ = std::fs::remove_file(&path);
        }

        #[tokio::test]
        async fn test_subscribe_sends_filter() {
            let (mut client, mut broker, path) = connected_pair("subscribe").await;

            client
                .subscribe("sensors/temperature", |_payload| async { Ok(()) })
                .await
                .unwrap();

            let expected = encode_subscribe(&client.filter().serialize());
            let mut buf = vec![0u8; expected.len()];
            broker.read_exact(&mut buf).await.unwrap();
            assert_eq!(buf, expected);

            assert_eq!(client.subscription_count().await, 1);
            assert!(client.filter().contains_exact("sensors/temperature"));

            let _ = std::fs::remove_file(&path);
        }

        #[tokio::test]
        async fn test_message_dispatches_to_callback() {
            let (mut client, mut broker, path) = connected_pair("dispatch").await;
            let (tx, mut rx) = mpsc::unbounded_channel();

            client
                .subscribe("x", move |payload| {
                    let tx = tx.clone();
                    async move {
                        tx.send(payload).expect("receiver alive");
                        Ok(())
                    }
                })
                .await
                .unwrap();

            // Drain the SUB command so the broker side stays in sync.
            let sub_len = encode_subscribe(&client.filter().serialize()).len();
            let mut drain = vec![0u8; sub_len];
            broker.read_exact(&mut drain).await.unwrap();

            broker.write_all(b"MSG x|42\n").await.unwrap();

            let payload = rx.recv().await.expect("callback invoked");
            assert_eq!(payload, "42");
            // Exactly once.
            assert!(rx.try_recv().is_err());

            let _ = std::fs::remove_file(&path);
        }

        #[tokio::test]
        async fn test_unsubscribed_topic_is_silent() {
            let (mut client, mut broker, path) = connected_pair("silent").await;
            let (tx, mut rx) = mpsc::unbounded_channel();

            client
                .subscribe("x", move |payload| {
                    let tx = tx.clone();
                    async move {
                        tx.send(payload).expect("receiver alive");
                        Ok(())
                    }
                })
                .await
                .unwrap();

            // A message for an unsubscribed topic, then one for "x" so there
            // is a positive signal to wait on.
            broker.write_all(b"MSG other|zzz\nMSG x|ok\n").await.unwrap();

            assert_eq!(rx.recv().await.unwrap(), "ok");
            assert!(rx.try_recv().is_err());

            let _ = std::fs::remove_file(&path);
        }

        #[tokio::test]
        async fn test_callback_error_does_not_stop_dispatch() {
            let (mut client, mut broker, path) = connected_pair("callback-err").await;
            let (tx, mut rx) = mpsc::unbounded_channel();

            client
                .subscribe("x", move |payload| {
                    let tx = tx.clone();
                    async move {
                        if payload == "boom" {
                            return Err(PubsubError::ConnectionClosed);
                        }
                        tx.send(payload).expect("receiver alive");
                        Ok(())
                    }
                })
                .await
                .unwrap();

            broker.write_all(b"MSG x|boom\nMSG x|after\n").await.unwrap();

            // The loop survives the failing invocation.
            assert_eq!(rx.recv().await.unwrap(), "after");

            let _ = std::fs::remove_file(&path);
        }

        #[tokio::test]
        async fn test_unsubscribe_resends_filter() {
            let (mut client, mut broker, path) = connected_pair("unsubscribe").await;

            client.subscribe("a", |_payload| async { Ok(()) }).await.unwrap();
            client.subscribe("b", |_payload| async { Ok(()) }).await.unwrap();
            client.unsubscribe("a").await.unwrap();

            assert_eq!(client.subscription_count().await, 1);
            assert!(!client.filter().contains_exact("a"));
            assert!(client.filter().contains_exact("b"));

            // Three SUB commands were queued; the last one's filter no
            // longer matches "a" exactly.
            let expected_last = encode_subscribe(&client.filter().serialize());
            let mut received = Vec::new();
            while received.len() < expected_last.len() * 3 {
                let mut chunk = vec![0u8; 4096];
                let n = broker.read(&mut chunk).await.unwrap();
                assert!(n > 0, "broker stream closed early");
                received.extend_from_slice(&chunk[..n]);
            }
            assert_eq!(&received[received.len() - expected_last.len()..], &expected_last[..]);

            let _ = std::fs::remove_file(&path);
        }

        #[tokio::test]
        async fn test_disconnect_stops_tasks_and_state() {
            let (mut client, mut broker, path) = connected_pair("disconnect").await;

            client.disconnect().await.unwrap();

            assert_eq!(client.state(), ConnectionState::Disconnected);
            assert!(matches!(
                client.publish("t", "m").await,
                Err(PubsubError::NotConnected)
            ));

            // Broker observes the closed stream.
            let mut buf = [0u8; 8];
            let n = broker.read(&mut buf).await.unwrap();
            assert_eq!(n, 0);

            let _ = std::fs::remove_file(&path);
        }

        #[tokio::test]
        async fn test_peer_close_ends_receive_loop() {
            let (mut client, broker, path) = connected_pair("peer-close").await;

            drop(broker);

            // The reader observes EOF and records the disconnect.
            let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(1);
            while client.state() != ConnectionState::Disconnected {
                assert!(tokio::time::Instant::now() < deadline, "reader never exited");
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }

            // Reconnection is a fresh connect call against a new listener.
            let _ = std::fs::remove_file(&path);
            let listener = UnixListener::bind(&path).unwrap();
            let (connected, accepted) = tokio::join!(client.connect(), listener.accept());
            connected.unwrap();
            accepted.unwrap();
            assert!(client.is_connected());

            client.disconnect().await.unwrap();
            let _ = std::fs::remove_file(&path);
        }
    }
}
