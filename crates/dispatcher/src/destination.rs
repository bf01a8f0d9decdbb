//! Destination - address resolution and ordered fan-out
//!
//! A `Destination` is one resolved delivery target; `Destinations` is the
//! ordered set a consume loop fans every record out to.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

use contracts::{
    BoxedReader, ByteStream, DestinationConfig, Encoder, Record, RelayError, Sender,
};

use crate::encoders::RawEncoder;
use crate::metrics::{DestinationMetrics, MetricsSnapshot};
use crate::reader::MergedReader;
use crate::registry::{split_scheme, Registry};

/// How a destination delivers records.
///
/// Exactly one shape per destination, fixed at construction: either a
/// self-contained sender, or a byte transport paired with an encoder.
pub enum DestinationKind {
    /// A sender plugin owns encoding and transport.
    Sender(Box<dyn Sender>),
    /// Records are encoded into `buf` and written to the transport.
    Stream {
        stream: ByteStream,
        encoder: Arc<dyn Encoder>,
        /// Reusable encode scratch buffer.
        buf: Vec<u8>,
    },
}

/// One resolved delivery target.
pub struct Destination {
    name: String,
    kind: DestinationKind,
    metrics: Arc<DestinationMetrics>,
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            DestinationKind::Sender(_) => "sender",
            DestinationKind::Stream { .. } => "stream",
        };
        f.debug_struct("Destination")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

impl Destination {
    /// Resolve an address against the registry and open the target.
    ///
    /// A sender registered under the full scheme wins; otherwise the
    /// scheme's first `+` segment picks the transport and its last
    /// segment picks the encoder, raw passthrough when absent.
    ///
    /// # Errors
    /// [`RelayError::UnknownScheme`] when nothing serves the scheme;
    /// sender construction errors pass through untouched; transport
    /// construction errors are wrapped with the destination name.
    #[instrument(
        name = "destination_open",
        skip(config, registry),
        fields(destination = %config.name, scheme = %config.scheme())
    )]
    pub async fn open(
        config: &DestinationConfig,
        registry: &Registry,
    ) -> Result<Self, RelayError> {
        let scheme = config.scheme();

        if let Some(driver) = registry.sender(scheme) {
            let sender = driver.open(&config.url).await?;
            debug!(destination = %config.name, "Sender destination opened");
            return Ok(Self {
                name: config.name.clone(),
                kind: DestinationKind::Sender(sender),
                metrics: Arc::new(DestinationMetrics::new()),
            });
        }

        let (base, suffix) = split_scheme(scheme);
        let transport = registry
            .transport(base)
            .ok_or_else(|| RelayError::unknown_scheme(scheme))?;

        let stream = transport
            .open(&config.url)
            .await
            .map_err(|e| RelayError::open(&config.name, e.to_string()))?;

        let (encoder, encoding): (Arc<dyn Encoder>, &str) = match suffix {
            Some(s) => match registry.encoder(s) {
                Some(encoder) => (encoder, s),
                None => (Arc::new(RawEncoder), "raw"),
            },
            None => (Arc::new(RawEncoder), "raw"),
        };

        debug!(
            destination = %config.name,
            transport = %base,
            encoding = %encoding,
            "Stream destination opened"
        );

        Ok(Self {
            name: config.name.clone(),
            kind: DestinationKind::Stream {
                stream,
                encoder,
                buf: Vec::new(),
            },
            metrics: Arc::new(DestinationMetrics::new()),
        })
    }

    /// Destination name (for logging/metrics).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delivery counters for this destination.
    pub fn metrics(&self) -> &Arc<DestinationMetrics> {
        &self.metrics
    }

    /// Deliver one record.
    ///
    /// # Errors
    /// Both delivery shapes surface their failure; nothing is swallowed.
    pub async fn send(&mut self, record: &Record) -> Result<(), RelayError> {
        match &mut self.kind {
            DestinationKind::Sender(sender) => sender.send(record).await,
            DestinationKind::Stream {
                stream,
                encoder,
                buf,
            } => {
                buf.clear();
                encoder.encode(record, buf)?;
                stream
                    .write_all(buf)
                    .await
                    .map_err(|e| RelayError::send(&self.name, e.to_string()))
            }
        }
    }

    /// Release the underlying sender or transport.
    ///
    /// Stream destinations flush transport buffers before shutdown and
    /// tolerate repeated close calls.
    pub async fn close(&mut self) -> Result<(), RelayError> {
        match &mut self.kind {
            DestinationKind::Sender(sender) => sender.close().await,
            DestinationKind::Stream { stream, .. } => {
                stream.close().await?;
                Ok(())
            }
        }
    }

    /// Take the readable half, if this destination has one. Sender
    /// destinations never do.
    pub fn take_reader(&mut self) -> Option<BoxedReader> {
        match &mut self.kind {
            DestinationKind::Sender(_) => None,
            DestinationKind::Stream { stream, .. } => stream.take_reader(),
        }
    }
}

/// The ordered destination set a consume loop delivers to.
///
/// Order is configuration order: every record visits destinations in the
/// sequence they were opened or pushed.
#[derive(Default)]
pub struct Destinations {
    dests: Vec<Destination>,
    send_timeout: Option<Duration>,
}

impl Destinations {
    /// Empty set with no send deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open every config in order against the registry.
    ///
    /// # Errors
    /// The first resolution or open failure aborts the whole batch.
    #[instrument(
        name = "destinations_open",
        skip(configs, registry),
        fields(destinations = configs.len())
    )]
    pub async fn open(
        configs: &[DestinationConfig],
        registry: &Registry,
    ) -> Result<Self, RelayError> {
        let mut dests = Vec::with_capacity(configs.len());
        for config in configs {
            dests.push(Destination::open(config, registry).await?);
        }
        Ok(Self {
            dests,
            send_timeout: None,
        })
    }

    /// Bound every send by a deadline; an elapsed deadline counts as a
    /// send failure for that destination.
    pub fn with_send_timeout(mut self, limit: Duration) -> Self {
        self.send_timeout = Some(limit);
        self
    }

    /// Append a destination at the end of the delivery order.
    pub fn push(&mut self, dest: Destination) {
        self.dests.push(dest);
    }

    /// Number of destinations.
    pub fn len(&self) -> usize {
        self.dests.len()
    }

    /// True if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.dests.is_empty()
    }

    /// Destination names in delivery order.
    pub fn names(&self) -> Vec<&str> {
        self.dests.iter().map(Destination::name).collect()
    }

    /// Counter snapshots for all destinations, in delivery order.
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.dests
            .iter()
            .map(|d| (d.name().to_string(), d.metrics().snapshot()))
            .collect()
    }

    /// Consume records until the end-of-stream sentinel (`None`) or the
    /// channel closes, fanning each record out to every destination.
    ///
    /// Per-destination send failures are counted and logged, never
    /// escalated. Completion is signalled on `done` exactly once, even
    /// when the set is empty (records are then dropped with a warning).
    #[instrument(
        name = "destinations_consume",
        skip(self, records, done),
        fields(destinations = self.dests.len())
    )]
    pub async fn consume(
        &mut self,
        mut records: mpsc::Receiver<Option<Record>>,
        done: oneshot::Sender<bool>,
    ) {
        if self.dests.is_empty() {
            warn!("No destinations configured, records will be dropped");
        }
        info!(destinations = self.dests.len(), "Consume loop started");

        let mut record_count: u64 = 0;

        while let Some(item) = records.recv().await {
            let record = match item {
                Some(record) => record,
                // End-of-stream sentinel
                None => break,
            };

            record_count += 1;
            self.dispatch(&record).await;

            if record_count.is_multiple_of(100) {
                debug!(records = record_count, "Consume progress");
            }
        }

        info!(records = record_count, "Consume loop finished");

        // The receiver may already be gone; completion is reported once
        // either way.
        let _ = done.send(true);
    }

    async fn dispatch(&mut self, record: &Record) {
        let limit = self.send_timeout;

        for dest in &mut self.dests {
            let outcome = match limit {
                Some(limit) => timeout(limit, dest.send(record)).await,
                None => Ok(dest.send(record).await),
            };
            let result = match outcome {
                Ok(result) => result,
                Err(_) => Err(RelayError::send(dest.name(), "send deadline elapsed")),
            };

            match result {
                Ok(()) => dest.metrics().inc_send_count(),
                Err(e) => {
                    dest.metrics().inc_failure_count();
                    warn!(destination = %dest.name(), error = %e, "Send failed");
                    // Keep going - one destination must not stall the rest
                }
            }
        }
    }

    /// Close every destination, in order, regardless of failures.
    ///
    /// # Errors
    /// Returns the first close failure; later ones are logged only.
    #[instrument(name = "destinations_close", skip(self))]
    pub async fn close(&mut self) -> Result<(), RelayError> {
        let mut first_error = None;

        for dest in &mut self.dests {
            if let Err(e) = dest.close().await {
                error!(destination = %dest.name(), error = %e, "Close failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Merge the readable halves of all stream destinations into one
    /// reader. Each half can be taken only once.
    pub fn reader(&mut self) -> MergedReader {
        let sources = self
            .dests
            .iter_mut()
            .filter_map(Destination::take_reader)
            .collect();
        MergedReader::new(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::{Column, SenderDriver};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tokio::io::AsyncReadExt;
    use tokio::time::sleep;
    use url::Url;

    /// Test sender that appends `(destination, msg)` events to a shared log.
    struct RecordingSender {
        name: String,
        log: Arc<Mutex<Vec<(String, String)>>>,
        closed: Arc<AtomicBool>,
        fail_close: bool,
    }

    #[async_trait]
    impl Sender for RecordingSender {
        async fn send(&mut self, record: &Record) -> Result<(), RelayError> {
            let msg = record
                .get("msg")
                .and_then(|c| c.as_str())
                .unwrap_or_default()
                .to_string();
            self.log.lock().unwrap().push((self.name.clone(), msg));
            Ok(())
        }

        async fn close(&mut self) -> Result<(), RelayError> {
            self.closed.store(true, Ordering::Relaxed);
            if self.fail_close {
                return Err(RelayError::send(&self.name, "close failed"));
            }
            Ok(())
        }
    }

    struct SlowSender;

    #[async_trait]
    impl Sender for SlowSender {
        async fn send(&mut self, _record: &Record) -> Result<(), RelayError> {
            sleep(Duration::from_millis(200)).await;
            Ok(())
        }

        async fn close(&mut self) -> Result<(), RelayError> {
            Ok(())
        }
    }

    struct RecordingSenderDriver {
        log: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl SenderDriver for RecordingSenderDriver {
        async fn open(&self, url: &Url) -> Result<Box<dyn Sender>, RelayError> {
            Ok(Box::new(RecordingSender {
                name: url.host_str().unwrap_or("sender").to_string(),
                log: Arc::clone(&self.log),
                closed: Arc::new(AtomicBool::new(false)),
                fail_close: false,
            }))
        }
    }

    fn sender_destination(
        name: &str,
        log: &Arc<Mutex<Vec<(String, String)>>>,
        closed: &Arc<AtomicBool>,
        fail_close: bool,
    ) -> Destination {
        Destination {
            name: name.to_string(),
            kind: DestinationKind::Sender(Box::new(RecordingSender {
                name: name.to_string(),
                log: Arc::clone(log),
                closed: Arc::clone(closed),
                fail_close,
            })),
            metrics: Arc::new(DestinationMetrics::new()),
        }
    }

    fn record(msg: &str) -> Record {
        Record::from_iter([("msg", Column::String(msg.into()))])
    }

    #[tokio::test]
    async fn test_fanout_is_complete_and_ordered() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let mut dests = Destinations::new();
        dests.push(sender_destination("d1", &log, &closed, false));
        dests.push(sender_destination("d2", &log, &closed, false));

        let (tx, rx) = mpsc::channel(8);
        let (done_tx, done_rx) = oneshot::channel();

        tx.send(Some(record("r1"))).await.unwrap();
        tx.send(Some(record("r2"))).await.unwrap();
        tx.send(None).await.unwrap();

        dests.consume(rx, done_tx).await;
        assert_eq!(done_rx.await, Ok(true));

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                ("d1".to_string(), "r1".to_string()),
                ("d2".to_string(), "r1".to_string()),
                ("d1".to_string(), "r2".to_string()),
                ("d2".to_string(), "r2".to_string()),
            ]
        );

        for (_, snapshot) in dests.metrics() {
            assert_eq!(snapshot.send_count, 2);
            assert_eq!(snapshot.failure_count, 0);
        }
    }

    #[tokio::test]
    async fn test_sentinel_stops_before_later_records() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let mut dests = Destinations::new();
        dests.push(sender_destination("d1", &log, &closed, false));

        let (tx, rx) = mpsc::channel(8);
        let (done_tx, done_rx) = oneshot::channel();

        tx.send(Some(record("before"))).await.unwrap();
        tx.send(None).await.unwrap();
        tx.send(Some(record("after"))).await.unwrap();

        dests.consume(rx, done_tx).await;
        assert_eq!(done_rx.await, Ok(true));

        let events = log.lock().unwrap().clone();
        assert_eq!(events, vec![("d1".to_string(), "before".to_string())]);
    }

    #[tokio::test]
    async fn test_channel_close_terminates_like_sentinel() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let mut dests = Destinations::new();
        dests.push(sender_destination("d1", &log, &closed, false));

        let (tx, rx) = mpsc::channel(8);
        let (done_tx, done_rx) = oneshot::channel();

        tx.send(Some(record("only"))).await.unwrap();
        drop(tx);

        dests.consume(rx, done_tx).await;
        assert_eq!(done_rx.await, Ok(true));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_set_drains_and_signals() {
        let mut dests = Destinations::new();

        let (tx, rx) = mpsc::channel(8);
        let (done_tx, done_rx) = oneshot::channel();

        tx.send(Some(record("dropped"))).await.unwrap();
        tx.send(None).await.unwrap();

        dests.consume(rx, done_tx).await;
        assert_eq!(done_rx.await, Ok(true));
    }

    #[tokio::test]
    async fn test_close_returns_first_error_but_closes_all() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let closed1 = Arc::new(AtomicBool::new(false));
        let closed2 = Arc::new(AtomicBool::new(false));

        let mut dests = Destinations::new();
        dests.push(sender_destination("d1", &log, &closed1, true));
        dests.push(sender_destination("d2", &log, &closed2, false));

        let err = dests.close().await.unwrap_err();
        assert!(err.to_string().contains("d1"));

        // The failure did not stop the second close.
        assert!(closed1.load(Ordering::Relaxed));
        assert!(closed2.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_send_deadline_counts_as_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let mut dests = Destinations::new().with_send_timeout(Duration::from_millis(10));
        dests.push(Destination {
            name: "slow".to_string(),
            kind: DestinationKind::Sender(Box::new(SlowSender)),
            metrics: Arc::new(DestinationMetrics::new()),
        });
        dests.push(sender_destination("fast", &log, &closed, false));

        let (tx, rx) = mpsc::channel(8);
        let (done_tx, done_rx) = oneshot::channel();

        tx.send(Some(record("r1"))).await.unwrap();
        tx.send(None).await.unwrap();

        dests.consume(rx, done_tx).await;
        assert_eq!(done_rx.await, Ok(true));

        let metrics = dests.metrics();
        assert_eq!(metrics[0].1.failure_count, 1);
        assert_eq!(metrics[0].1.send_count, 0);
        // The slow destination did not block the fast one.
        assert_eq!(metrics[1].1.send_count, 1);
    }

    #[tokio::test]
    async fn test_open_prefers_sender_registry() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = Registry::with_builtins();
        registry.register_sender(
            "mem",
            Box::new(RecordingSenderDriver {
                log: Arc::clone(&log),
            }),
        );

        let config = DestinationConfig::new("loop", "mem://loop").unwrap();
        let mut dest = Destination::open(&config, &registry).await.unwrap();

        // A mem transport would expose a readable half; the sender path
        // never does.
        assert!(dest.take_reader().is_none());

        dest.send(&record("via sender")).await.unwrap();
        dest.close().await.unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_unknown_scheme_errors() {
        let registry = Registry::with_builtins();
        let config = DestinationConfig::new("bad", "warp://nowhere:1").unwrap();

        let err = Destination::open(&config, &registry).await.unwrap_err();
        assert!(matches!(err, RelayError::UnknownScheme { .. }));
    }

    #[tokio::test]
    async fn test_open_unregistered_suffix_falls_back_to_raw() {
        let registry = Registry::with_builtins();
        let config = DestinationConfig::new("cap", "mem+nope://capture").unwrap();

        let mut dest = Destination::open(&config, &registry).await.unwrap();
        dest.send(&record("plain line")).await.unwrap();
        dest.close().await.unwrap();

        let mut reader = dest.take_reader().unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"plain line\n");
    }

    #[tokio::test]
    async fn test_open_resolves_encoder_suffix() {
        let registry = Registry::with_builtins();
        let config = DestinationConfig::new("cap", "mem+json://capture").unwrap();

        let mut dest = Destination::open(&config, &registry).await.unwrap();
        dest.send(&record("hello")).await.unwrap();
        dest.close().await.unwrap();

        let mut reader = dest.take_reader().unwrap();
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["msg"], "hello");
    }
}
