//! TcpTransport - buffered stream connection

use async_trait::async_trait;
use tokio::io::{BufReader, BufWriter};
use tokio::net::TcpStream;
use tracing::debug;
use url::Url;

use contracts::{ByteStream, RelayError, TransportDriver};

use super::host_port;

/// Connects to `host:port` (both mandatory) and buffers both directions.
///
/// Closing the stream flushes the write buffer before the socket shuts
/// down, so short final writes are never lost.
#[derive(Debug, Default)]
pub struct TcpTransport;

#[async_trait]
impl TransportDriver for TcpTransport {
    async fn open(&self, url: &Url) -> Result<ByteStream, RelayError> {
        let peer = host_port(url)?;
        let stream = TcpStream::connect(peer.as_str()).await?;
        debug!(target = %peer, "TCP transport connected");

        let (read_half, write_half) = stream.into_split();
        Ok(ByteStream::new(
            Box::new(BufReader::new(read_half)),
            Box::new(BufWriter::new(write_half)),
        ))
    }
}
