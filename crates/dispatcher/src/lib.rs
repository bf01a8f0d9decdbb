//! # Dispatcher
//!
//! Record routing core.
//!
//! Responsibilities:
//! - Resolve destination addresses against the plugin registry
//! - Consume a record stream and fan out to every destination in order
//! - Merge destination read halves into one stream
//!
//! Built-in transports (`file`, `udp`, `tcp`, `mem`) and encoders
//! (`json`, `statsd`, raw fallback) live here; senders come from
//! registrations outside this crate.

pub mod destination;
pub mod encoders;
pub mod metrics;
pub mod reader;
pub mod registry;
pub mod transports;

pub use contracts::{Column, DestinationConfig, Record, RelayError};
pub use destination::{Destination, DestinationKind, Destinations};
pub use encoders::{JsonEncoder, RawEncoder, StatsdEncoder};
pub use metrics::{DestinationMetrics, MetricsSnapshot};
pub use reader::MergedReader;
pub use registry::{split_scheme, Registry, ResolvedRoute};
pub use transports::{FileTransport, MemTransport, TcpTransport, UdpTransport};
