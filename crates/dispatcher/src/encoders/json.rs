//! JsonEncoder - one JSON object per record

use contracts::{Encoder, Record, RelayError};

/// Renders a record as a single JSON object per line.
///
/// Columns appear as raw values (strings and integers, no type tags), so
/// the output is plain newline-delimited JSON for downstream collectors.
#[derive(Debug, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), RelayError> {
        serde_json::to_writer(&mut *out, record)
            .map_err(|e| RelayError::encode(e.to_string()))?;
        out.push(b'\n');
        Ok(())
    }
}
