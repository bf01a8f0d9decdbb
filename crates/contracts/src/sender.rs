//! Sender traits - self-contained delivery plugins
//!
//! A sender owns both the encoding and the transport for its scheme; the
//! relay hands it whole records and never sees the bytes.

use async_trait::async_trait;
use url::Url;

use crate::{Record, RelayError};

/// A live connection that delivers whole records.
///
/// Implementations are driven from a single consume task, so `send` takes
/// `&mut self` and needs no internal locking.
#[async_trait]
pub trait Sender: Send {
    /// Deliver one record.
    ///
    /// # Errors
    /// Returns a delivery error; the caller logs it and keeps going.
    async fn send(&mut self, record: &Record) -> Result<(), RelayError>;

    /// Release the connection. Implementations should tolerate a second
    /// close call.
    async fn close(&mut self) -> Result<(), RelayError>;
}

/// Factory for [`Sender`]s, registered under a full address scheme.
#[async_trait]
pub trait SenderDriver: Send + Sync {
    /// Open a sender for the given address.
    ///
    /// # Errors
    /// Construction errors abort the destination's startup.
    async fn open(&self, url: &Url) -> Result<Box<dyn Sender>, RelayError>;
}
