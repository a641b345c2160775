//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management. Inbound frames are
//! newline-delimited; as a bounded-growth fallback for peers that omit the
//! delimiter, a buffer that grows past [`FRAME_FALLBACK_THRESHOLD`] bytes
//! without a newline is emitted whole as one frame.
//!
//! The fallback boundary is ambiguous for a legitimate frame longer than the
//! threshold - it will be split. The wire behavior is kept for compatibility
//! with the broker, and the fallback path logs a warning so deployments can
//! see when they are relying on it.
//!
//! # Example
//!
//! ```
//! use pubsub_client::protocol::FrameBuffer;
//!
//! let mut buffer = FrameBuffer::new();
//! let frames = buffer.push(b"MSG a|hello\nMSG ");
//! assert_eq!(frames.len(), 1);
//! assert_eq!(&frames[0][..], b"MSG a|hello");
//!
//! // The partial tail completes on the next read.
//! let frames = buffer.push(b"b|world\n");
//! assert_eq!(&frames[0][..], b"MSG b|world");
//! ```

use bytes::{Bytes, BytesMut};

/// Buffered length above which a delimiter-less buffer is emitted whole.
pub const FRAME_FALLBACK_THRESHOLD: usize = 100;

/// Buffer for accumulating inbound bytes and extracting complete frames.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
}

impl FrameBuffer {
    /// Create a new empty frame buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Returns the extracted frames in arrival order; unconsumed bytes stay
    /// buffered for the next push. May be called with arbitrarily fragmented
    /// input - a frame split across reads is reassembled without loss or
    /// duplication.
    pub fn push(&mut self, data: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one() {
            frames.push(frame);
        }
        frames
    }

    /// Try to extract a single frame from the buffer.
    ///
    /// Newline-preferred: the bytes before the first newline form a frame and
    /// the delimiter is discarded. Fallback: past the threshold with no
    /// newline in sight, the whole buffer is one frame.
    fn try_extract_one(&mut self) -> Option<Bytes> {
        if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let frame = self.buffer.split_to(pos).freeze();
            let _ = self.buffer.split_to(1); // discard the delimiter
            return Some(frame);
        }

        if self.buffer.len() > FRAME_FALLBACK_THRESHOLD {
            tracing::warn!(
                len = self.buffer.len(),
                "no delimiter within {FRAME_FALLBACK_THRESHOLD} bytes, emitting buffer as one frame"
            );
            return Some(self.buffer.split().freeze());
        }

        None
    }

    /// Number of buffered bytes awaiting a frame boundary.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds no pending bytes.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discard all buffered bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
