//! Dedicated writer task for outbound commands.
//!
//! All writes to the broker go through a single task that receives
//! pre-encoded commands over a bounded mpsc channel:
//!
//! ```text
//! publish     ─┐
//! subscribe   ─┼─► mpsc::Sender<Bytes> ─► Writer Task ─► Socket
//! unsubscribe ─┘
//! ```
//!
//! This is the write-serialization discipline the transport requires: the
//! underlying stream is not safe for concurrent fragmented writes, and the
//! single consumer makes interleaving impossible without a lock. The bounded
//! channel doubles as backpressure - senders suspend when the queue is full.
//!
//! Each command is written and flushed individually. Commands are the
//! broker's parse unit, so they are never coalesced into one write.

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{PubsubError, Result};

/// Default capacity of the outbound command channel.
pub const DEFAULT_WRITER_CAPACITY: usize = 64;

/// Handle for sending commands to the writer task.
///
/// Cheaply cloneable. Dropping every handle closes the channel, which makes
/// the writer task flush, shut the stream down, and exit.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Bytes>,
}

impl WriterHandle {
    /// Queue a pre-encoded command for writing.
    ///
    /// Suspends while the channel is full.
    ///
    /// # Errors
    ///
    /// [`PubsubError::ConnectionClosed`] if the writer task has exited.
    pub async fn send(&self, command: Bytes) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| PubsubError::ConnectionClosed)
    }
}

/// Spawn the writer task and return a handle for sending commands.
pub fn spawn_writer_task<W>(writer: W, capacity: usize) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity);
    let task = tokio::spawn(writer_loop(rx, writer));
    (WriterHandle { tx }, task)
}

/// Main writer loop - writes and flushes each command, closing the stream
/// when the channel drains.
async fn writer_loop<W>(mut rx: mpsc::Receiver<Bytes>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(command) = rx.recv().await {
        writer.write_all(&command).await?;
        writer.flush().await?;
    }

    // Channel closed: all handles dropped, clean shutdown.
    if let Err(e) = writer.shutdown().await {
        tracing::debug!("stream shutdown after writer drain failed: {e}");
    }
    Ok(())
}
