//! Built-in encoder implementations
//!
//! Contains RawEncoder, JsonEncoder, and StatsdEncoder.

mod json;
mod raw;
mod statsd;

pub use self::json::JsonEncoder;
pub use self::raw::RawEncoder;
pub use self::statsd::StatsdEncoder;
