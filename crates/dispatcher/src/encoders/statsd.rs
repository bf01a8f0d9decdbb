//! StatsdEncoder - key:value|type metric tokens

use contracts::{Column, Encoder, Record, RelayError};

/// Renders each numeric column as a statsd token: `key:value|g` for
/// gauges, `|m` for metrics, `|c` for counters.
///
/// Every token ends with a newline, so several metrics from one record
/// form a valid multi-metric packet instead of running together. String
/// columns carry no metric semantics and are skipped.
#[derive(Debug, Default)]
pub struct StatsdEncoder;

impl Encoder for StatsdEncoder {
    fn encode(&self, record: &Record, out: &mut Vec<u8>) -> Result<(), RelayError> {
        for (field, column) in record.iter() {
            let (value, kind) = match column {
                Column::Gauge(v) => (v, "g"),
                Column::Metric(v) => (v, "m"),
                Column::Counter(v) => (v, "c"),
                Column::String(_) => continue,
            };
            out.extend_from_slice(format!("{field}:{value}|{kind}\n").as_bytes());
        }
        Ok(())
    }
}
