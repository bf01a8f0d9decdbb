//! MemTransport - in-memory loopback

use async_trait::async_trait;
use url::Url;

use contracts::{ByteStream, RelayError, TransportDriver};

const DEFAULT_CAPACITY: usize = 64 * 1024;

/// In-memory loopback: everything written to the stream can be read back
/// from its own read half. Serves as a test double and local capture
/// target; the merged reader exists mostly for this transport.
///
/// `mem://name?capacity=N` sets the buffer size in bytes. Writes block
/// once the buffer is full and nobody reads. A zero or unparseable
/// capacity falls back to the default.
#[derive(Debug, Default)]
pub struct MemTransport;

#[async_trait]
impl TransportDriver for MemTransport {
    async fn open(&self, url: &Url) -> Result<ByteStream, RelayError> {
        let capacity = url
            .query_pairs()
            .find(|(key, _)| key == "capacity")
            .and_then(|(_, value)| value.parse().ok())
            .filter(|&capacity| capacity > 0)
            .unwrap_or(DEFAULT_CAPACITY);

        let (near, far) = tokio::io::duplex(capacity);
        Ok(ByteStream::new(Box::new(far), Box::new(near)))
    }
}
