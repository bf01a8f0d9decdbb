//! # Contracts
//!
//! Frozen interface contracts, defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - Records flow producer -> channel -> fan-out, best effort per destination
//! - `None` on the record channel marks end of stream; an empty record does not

mod config;
mod encoder;
mod error;
mod record;
mod sender;
mod stream;

pub use config::DestinationConfig;
pub use encoder::Encoder;
pub use error::RelayError;
pub use record::{Column, ColumnKind, Record};
pub use sender::{Sender, SenderDriver};
pub use stream::{BoxedReader, BoxedWriter, ByteStream, TransportDriver};
