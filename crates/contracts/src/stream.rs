//! ByteStream - transport byte-stream handle
//!
//! What a transport driver hands back: a writable half with explicit
//! close, and a readable half taken at most once for merged read-back.

use std::fmt;
use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::RelayError;

/// Boxed readable half of a transport stream.
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Boxed writable half of a transport stream.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Factory for byte transports, registered under a base scheme.
///
/// Transport drivers move bytes and know nothing about records; pairing
/// with an encoder happens at destination construction.
#[async_trait]
pub trait TransportDriver: Send + Sync {
    /// Open a byte stream to the given address.
    ///
    /// # Errors
    /// Construction errors abort the destination's startup.
    async fn open(&self, url: &Url) -> Result<ByteStream, RelayError>;
}

/// Byte-stream handle produced by a transport driver.
///
/// Closing consumes the write half (shutdown flushes any transport-side
/// buffering first), so a second close is a no-op. Write-only transports
/// still expose a read half that is immediately at end-of-stream.
pub struct ByteStream {
    reader: Option<BoxedReader>,
    writer: Option<BoxedWriter>,
}

impl ByteStream {
    /// Wrap a readable and a writable half.
    pub fn new(reader: BoxedReader, writer: BoxedWriter) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
        }
    }

    /// Wrap a writable half; the read side reports end-of-stream at once.
    pub fn write_only(writer: BoxedWriter) -> Self {
        Self {
            reader: Some(Box::new(tokio::io::empty())),
            writer: Some(writer),
        }
    }

    /// Write the whole buffer to the stream.
    ///
    /// # Errors
    /// `NotConnected` once the stream has been closed, otherwise the
    /// transport's write error.
    pub async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.write_all(buf).await,
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "stream is closed",
            )),
        }
    }

    /// Shut the write half down, flushing anything buffered.
    ///
    /// Subsequent calls return `Ok(())` without touching the transport.
    pub async fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.shutdown().await,
            None => Ok(()),
        }
    }

    /// Take the readable half. Returns `None` on the second call.
    pub fn take_reader(&mut self) -> Option<BoxedReader> {
        self.reader.take()
    }

    /// True once `close` has run.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("readable", &self.reader.is_some())
            .field("closed", &self.writer.is_none())
            .finish()
    }
}
