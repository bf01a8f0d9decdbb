//! Registry - scheme-keyed plugin tables
//!
//! One registry instance owns every pluggable piece: sender drivers,
//! transport drivers, and encoders. It is populated during startup wiring
//! (`&mut`) and only read afterwards (`&`), so the borrow checker rules
//! out post-startup mutation.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{Encoder, RelayError, SenderDriver, TransportDriver};

use crate::encoders::{JsonEncoder, StatsdEncoder};
use crate::transports::{FileTransport, MemTransport, TcpTransport, UdpTransport};

/// Scheme-keyed tables of senders, transports, and encoders.
///
/// The three tables are independent: a scheme may appear in both the
/// sender and transport tables, in which case the sender wins at
/// resolution time.
#[derive(Default)]
pub struct Registry {
    senders: HashMap<String, Box<dyn SenderDriver>>,
    transports: HashMap<String, Box<dyn TransportDriver>>,
    encoders: HashMap<String, Arc<dyn Encoder>>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in transports (`file`, `udp`, `tcp`,
    /// `mem`) and encoders (`json`, `statsd`) installed.
    ///
    /// The raw passthrough encoder is not registered; it is the implicit
    /// fallback when an address names no encoder suffix.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_transport("file", Box::new(FileTransport));
        registry.register_transport("udp", Box::new(UdpTransport));
        registry.register_transport("tcp", Box::new(TcpTransport));
        registry.register_transport("mem", Box::new(MemTransport));
        registry.register_encoder("json", Arc::new(JsonEncoder));
        registry.register_encoder("statsd", Arc::new(StatsdEncoder));
        registry
    }

    /// Register a sender driver under a full address scheme.
    ///
    /// # Panics
    /// Panics if the scheme is already taken. Registration happens during
    /// startup wiring; a duplicate is a programming error and must fail
    /// before any record flows.
    pub fn register_sender(&mut self, scheme: impl Into<String>, driver: Box<dyn SenderDriver>) {
        let scheme = scheme.into();
        if self.senders.insert(scheme.clone(), driver).is_some() {
            panic!("sender scheme '{scheme}' registered twice");
        }
    }

    /// Register a transport driver under a base scheme.
    ///
    /// # Panics
    /// Panics if the scheme is already taken.
    pub fn register_transport(
        &mut self,
        scheme: impl Into<String>,
        driver: Box<dyn TransportDriver>,
    ) {
        let scheme = scheme.into();
        if self.transports.insert(scheme.clone(), driver).is_some() {
            panic!("transport scheme '{scheme}' registered twice");
        }
    }

    /// Register an encoder under a scheme suffix.
    ///
    /// # Panics
    /// Panics if the suffix is already taken.
    pub fn register_encoder(&mut self, suffix: impl Into<String>, encoder: Arc<dyn Encoder>) {
        let suffix = suffix.into();
        if self.encoders.insert(suffix.clone(), encoder).is_some() {
            panic!("encoder suffix '{suffix}' registered twice");
        }
    }

    /// Look up a sender driver by full scheme.
    pub fn sender(&self, scheme: &str) -> Option<&dyn SenderDriver> {
        self.senders.get(scheme).map(|driver| driver.as_ref())
    }

    /// Look up a transport driver by base scheme.
    pub fn transport(&self, scheme: &str) -> Option<&dyn TransportDriver> {
        self.transports.get(scheme).map(|driver| driver.as_ref())
    }

    /// Look up an encoder by scheme suffix.
    pub fn encoder(&self, suffix: &str) -> Option<Arc<dyn Encoder>> {
        self.encoders.get(suffix).cloned()
    }

    /// Registered sender schemes, sorted.
    pub fn sender_schemes(&self) -> Vec<String> {
        let mut schemes: Vec<_> = self.senders.keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// Registered transport schemes, sorted.
    pub fn transport_schemes(&self) -> Vec<String> {
        let mut schemes: Vec<_> = self.transports.keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// Registered encoder suffixes, sorted.
    pub fn encoder_suffixes(&self) -> Vec<String> {
        let mut suffixes: Vec<_> = self.encoders.keys().cloned().collect();
        suffixes.sort();
        suffixes
    }

    /// Report how a scheme would resolve, without opening anything.
    ///
    /// # Errors
    /// Returns [`RelayError::UnknownScheme`] when neither a sender nor a
    /// transport serves the scheme.
    pub fn check(&self, scheme: &str) -> Result<ResolvedRoute, RelayError> {
        if self.senders.contains_key(scheme) {
            return Ok(ResolvedRoute::Sender {
                scheme: scheme.to_string(),
            });
        }

        let (base, suffix) = split_scheme(scheme);
        if !self.transports.contains_key(base) {
            return Err(RelayError::unknown_scheme(scheme));
        }

        let encoder = suffix
            .filter(|s| self.encoders.contains_key(*s))
            .map(str::to_string);
        Ok(ResolvedRoute::Stream {
            transport: base.to_string(),
            encoder,
        })
    }
}

/// How an address scheme would be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRoute {
    /// A registered sender owns the whole scheme.
    Sender { scheme: String },
    /// A transport paired with a registered encoder; `None` means the raw
    /// passthrough encoder.
    Stream {
        transport: String,
        encoder: Option<String>,
    },
}

/// Split a composite scheme into its transport base and encoder suffix:
/// the first `+` segment and the last `+` segment respectively. Middle
/// segments are ignored.
pub fn split_scheme(scheme: &str) -> (&str, Option<&str>) {
    match scheme.split_once('+') {
        Some((base, rest)) => {
            let suffix = rest.rsplit_once('+').map_or(rest, |(_, last)| last);
            (base, Some(suffix))
        }
        None => (scheme, None),
    }
}
