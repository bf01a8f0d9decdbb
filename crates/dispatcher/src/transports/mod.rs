//! Built-in transport implementations
//!
//! Contains FileTransport, UdpTransport, TcpTransport, and MemTransport.

mod file;
mod mem;
mod tcp;
mod udp;

pub use self::file::FileTransport;
pub use self::mem::MemTransport;
pub use self::tcp::TcpTransport;
pub use self::udp::UdpTransport;

use contracts::RelayError;
use url::Url;

/// Extract `host:port` from an address. The socket transports require
/// both parts explicitly; there are no default ports.
fn host_port(url: &Url) -> Result<String, RelayError> {
    let host = url
        .host_str()
        .ok_or_else(|| RelayError::invalid_address(url.as_str(), "missing host"))?;
    let port = url
        .port()
        .ok_or_else(|| RelayError::invalid_address(url.as_str(), "missing port"))?;
    Ok(format!("{host}:{port}"))
}
