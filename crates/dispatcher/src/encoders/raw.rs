//! RawEncoder - passthrough text lines

use contracts::{Column, Encoder, Record, RelayError};

/// Writes every string column as its bare value plus a newline.
///
/// Numeric columns have no obvious text form and are skipped; use the
/// statsd or json encoders for those. This is the fallback encoder for
/// addresses that name no encoding suffix.
#[derive(Debug, Default)]
pub struct RawEncoder;

impl Encoder for RawEncoder {
    fn encode(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), RelayError> {
        for (_, column) in record.iter() {
            if let Column::String(value) = column {
                out.extend_from_slice(value.as_bytes());
                out.push(b'\n');
            }
        }
        Ok(())
    }
}
