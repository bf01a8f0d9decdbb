//! UdpTransport - fire-and-forget datagram output

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::AsyncWrite;
use tokio::net::UdpSocket;
use tracing::debug;
use url::Url;

use contracts::{ByteStream, RelayError, TransportDriver};

use super::host_port;

/// Connects a datagram socket to `host:port` (both mandatory). The
/// stream is write-only and each write leaves as one datagram.
#[derive(Debug, Default)]
pub struct UdpTransport;

#[async_trait]
impl TransportDriver for UdpTransport {
    async fn open(&self, url: &Url) -> Result<ByteStream, RelayError> {
        let peer = host_port(url)?;
        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(peer.as_str()).await?;
        debug!(target = %peer, "UDP transport connected");
        Ok(ByteStream::write_only(Box::new(DatagramWriter { socket })))
    }
}

/// AsyncWrite over a connected datagram socket. Flush and shutdown are
/// no-ops; UDP buffers nothing.
struct DatagramWriter {
    socket: UdpSocket,
}

impl AsyncWrite for DatagramWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.socket.poll_send(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
