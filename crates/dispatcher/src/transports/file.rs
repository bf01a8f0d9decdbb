//! FileTransport - append-only file output

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tracing::debug;
use url::Url;

use contracts::{BoxedWriter, ByteStream, RelayError, TransportDriver};

const STDOUT_PATH: &str = "/dev/stdout";
const STDERR_PATH: &str = "/dev/stderr";

/// Opens the addressed file in append mode, creating it if missing.
///
/// The URL host and path are joined, so `file://rel/path.log` and
/// `file:///abs/path.log` both work. The reserved paths `/dev/stdout`
/// and `/dev/stderr` route to the process's own streams instead of
/// opening a file. Streams are write-only.
#[derive(Debug, Default)]
pub struct FileTransport;

#[async_trait]
impl TransportDriver for FileTransport {
    async fn open(&self, url: &Url) -> Result<ByteStream, RelayError> {
        let path = file_path(url);
        let writer: BoxedWriter = match path.as_str() {
            STDOUT_PATH => Box::new(tokio::io::stdout()),
            STDERR_PATH => Box::new(tokio::io::stderr()),
            _ => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .await?;
                debug!(path = %path, "File opened for append");
                Box::new(file)
            }
        };
        Ok(ByteStream::write_only(writer))
    }
}

/// Join URL host and path into a filesystem path, dropping any trailing
/// slashes.
fn file_path(url: &Url) -> String {
    let mut path = String::new();
    if let Some(host) = url.host_str() {
        path.push_str(host);
    }
    path.push_str(url.path());
    path.trim_end_matches('/').to_string()
}
