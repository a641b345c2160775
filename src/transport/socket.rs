//! Platform-specific broker socket implementation.
//!
//! - Unix: Unix Domain Socket
//! - Windows: Named Pipe (client end)
//!
//! The rest of the crate never sees the concrete stream type: connected
//! streams split into `impl AsyncRead` / `impl AsyncWrite` halves.
//!
//! # Example
//!
//! ```ignore
//! use pubsub_client::transport::{BrokerStream, DEFAULT_SOCKET_PATH};
//!
//! let stream = BrokerStream::connect(DEFAULT_SOCKET_PATH).await?;
//! let (reader, writer) = stream.into_split();
//! ```

use crate::error::{PubsubError, Result};

/// Default broker socket path.
#[cfg(unix)]
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/pubsub.sock";

/// Default broker pipe path.
#[cfg(windows)]
pub const DEFAULT_SOCKET_PATH: &str = r"\\.\pipe\pubsub";

fn connect_error(path: &str, source: std::io::Error) -> PubsubError {
    PubsubError::Connect {
        path: path.to_string(),
        source,
    }
}

// ============================================================================
// Unix Implementation
// ============================================================================

#[cfg(unix)]
mod unix_impl {
    use super::*;
    use tokio::io::{AsyncRead, AsyncWrite};
    use tokio::net::UnixStream;

    /// Connected stream to the broker daemon.
    #[derive(Debug)]
    pub struct BrokerStream {
        stream: UnixStream,
    }

    impl BrokerStream {
        /// Connect to the broker's Unix socket at `path`.
        pub async fn connect(path: &str) -> Result<Self> {
            let stream = UnixStream::connect(path)
                .await
                .map_err(|e| connect_error(path, e))?;
            Ok(Self { stream })
        }

        /// Split into read and write halves.
        pub fn into_split(
            self,
        ) -> (impl AsyncRead + Send + Unpin, impl AsyncWrite + Send + Unpin) {
            self.stream.into_split()
        }
    }
}

// ============================================================================
// Windows Implementation
// ============================================================================

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use tokio::io::{AsyncRead, AsyncWrite};
    use tokio::net::windows::named_pipe::ClientOptions;

    /// Connected stream to the broker daemon.
    pub struct BrokerStream {
        pipe: tokio::net::windows::named_pipe::NamedPipeClient,
    }

    impl BrokerStream {
        /// Connect to the broker's named pipe at `path`.
        pub async fn connect(path: &str) -> Result<Self> {
            let pipe = ClientOptions::new()
                .open(path)
                .map_err(|e| connect_error(path, e))?;
            Ok(Self { pipe })
        }

        /// Split into read and write halves.
        pub fn into_split(
            self,
        ) -> (impl AsyncRead + Send + Unpin, impl AsyncWrite + Send + Unpin) {
            tokio::io::split(self.pipe)
        }
    }
}

// ============================================================================
// Platform-independent re-exports
// ============================================================================

#[cfg(unix)]
pub use unix_impl::BrokerStream;

#[cfg(windows)]
pub use windows_impl::BrokerStream;

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::UnixListener;

    fn scratch_socket_path(tag: &str) -> String {
        format!("/tmp/pubsub-test-{}-{tag}.sock", std::process::id())
    }

    #[tokio::test]
    async fn test_connect_missing_socket_fails() {
        let path = scratch_socket_path("absent");

        let err = BrokerStream::connect(&path).await.unwrap_err();

        match err {
            PubsubError::Connect { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Connect error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connect_and_split() {
        let path = scratch_socket_path("split");
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();

        let (stream, accepted) =
            tokio::join!(BrokerStream::connect(&path), listener.accept());
        let (mut reader, mut writer) = stream.unwrap().into_split();
        let (mut peer, _) = accepted.unwrap();

        writer.write_all(b"PUB t|m").await.unwrap();
        let mut buf = [0u8; 7];
        peer.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"PUB t|m");

        peer.write_all(b"MSG t|x\n").await.unwrap();
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"MSG t|x\n");

        let _ = std::fs::remove_file(&path);
    }
}
