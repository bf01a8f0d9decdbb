//! Encoder trait - record to wire bytes

use crate::{Record, RelayError};

/// Renders a record into a transport-ready byte sequence.
///
/// Encoders are stateless and shared between destinations, hence
/// `&self` and `Send + Sync`. Output is appended to `out` so the caller
/// can reuse one scratch buffer across sends.
pub trait Encoder: Send + Sync {
    /// Append the encoded form of `record` to `out`.
    ///
    /// # Errors
    /// Returns [`RelayError::Encode`] when the record cannot be rendered.
    fn encode(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), RelayError>;
}
