//! # Integration Tests
//!
//! End-to-end tests for the relay, without any real network peers.
//!
//! Covers:
//! - Contract surface smoke tests
//! - Full relay flow over in-memory transports
//! - Sender plugins overriding built-in transports

#[cfg(test)]
mod contract_tests {
    use contracts::{Column, Record};

    #[test]
    fn test_record_surface() {
        let mut record = Record::new();
        record.insert("line", Column::String("up".into()));
        record.insert("depth", Column::Gauge(3));
        record.insert("elapsed", Column::Metric(12));
        record.insert("restarts", Column::Counter(1));

        assert_eq!(record.len(), 4);
        assert_eq!(record.get("line").and_then(|c| c.as_str()), Some("up"));
        assert_eq!(record.get("depth").and_then(|c| c.as_i64()), Some(3));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use contracts::{Column, DestinationConfig, Record, RelayError, Sender, SenderDriver};
    use dispatcher::destination::{Destination, Destinations};
    use dispatcher::registry::Registry;
    use tokio::io::AsyncReadExt;
    use tokio::sync::{mpsc, oneshot};
    use url::Url;

    /// Sender plugin backed by an unbounded channel.
    struct ChannelSender {
        tx: mpsc::UnboundedSender<String>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Sender for ChannelSender {
        async fn send(&mut self, record: &Record) -> Result<(), RelayError> {
            let line = record
                .get("line")
                .and_then(|c| c.as_str())
                .unwrap_or_default()
                .to_string();
            self.tx
                .send(line)
                .map_err(|e| RelayError::send("chan", e.to_string()))
        }

        async fn close(&mut self) -> Result<(), RelayError> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    struct ChannelSenderDriver {
        tx: mpsc::UnboundedSender<String>,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl SenderDriver for ChannelSenderDriver {
        async fn open(&self, _url: &Url) -> Result<Box<dyn Sender>, RelayError> {
            Ok(Box::new(ChannelSender {
                tx: self.tx.clone(),
                closed: Arc::clone(&self.closed),
            }))
        }
    }

    fn line_record(line: &str) -> Record {
        Record::from_iter([("line", Column::String(line.into()))])
    }

    /// End-to-end flow: producer channel -> consume loop -> mem transport
    /// with JSON encoding, records read back from the captured side.
    #[tokio::test]
    async fn test_e2e_mem_relay() {
        let registry = Registry::with_builtins();
        let configs = vec![DestinationConfig::new("cap", "mem+json://capture").unwrap()];

        let mut destinations = Destinations::open(&configs, &registry).await.unwrap();
        let mut reader = destinations.reader();

        let (tx, rx) = mpsc::channel::<Option<Record>>(16);
        let (done_tx, done_rx) = oneshot::channel();

        let worker = tokio::spawn(async move {
            destinations.consume(rx, done_tx).await;
            let close_result = destinations.close().await;
            (destinations, close_result)
        });

        tx.send(Some(line_record("r1"))).await.unwrap();
        tx.send(Some(line_record("r2"))).await.unwrap();
        tx.send(None).await.unwrap();

        assert_eq!(done_rx.await, Ok(true));

        let result = tokio::time::timeout(Duration::from_secs(5), worker).await;
        assert!(result.is_ok(), "Relay worker timed out");
        let (destinations, close_result) = result.unwrap().unwrap();
        close_result.unwrap();

        // Closing dropped the writer half, so the reader sees EOF.
        let mut out = String::new();
        reader.read_to_string(&mut out).await.unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first["line"], "r1");
        assert_eq!(second["line"], "r2");

        for (_, snapshot) in destinations.metrics() {
            assert_eq!(snapshot.send_count, 2);
            assert_eq!(snapshot.failure_count, 0);
        }
    }

    /// A sender registered under a transport's scheme takes the records;
    /// the transport never opens.
    #[tokio::test]
    async fn test_e2e_sender_overrides_transport() {
        let (chan_tx, mut chan_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        let mut registry = Registry::with_builtins();
        registry.register_sender(
            "mem",
            Box::new(ChannelSenderDriver {
                tx: chan_tx,
                closed: Arc::clone(&closed),
            }),
        );

        let configs = vec![DestinationConfig::new("loop", "mem://loop").unwrap()];
        let mut destinations = Destinations::open(&configs, &registry).await.unwrap();

        // No transport opened, so there is no readable half to merge.
        assert_eq!(destinations.reader().source_count(), 0);

        let (tx, rx) = mpsc::channel::<Option<Record>>(16);
        let (done_tx, done_rx) = oneshot::channel();

        let worker = tokio::spawn(async move {
            destinations.consume(rx, done_tx).await;
            destinations.close().await
        });

        for line in ["a", "b", "c"] {
            tx.send(Some(line_record(line))).await.unwrap();
        }
        tx.send(None).await.unwrap();

        assert_eq!(done_rx.await, Ok(true));
        let result = tokio::time::timeout(Duration::from_secs(5), worker).await;
        assert!(result.is_ok(), "Relay worker timed out");
        result.unwrap().unwrap().unwrap();

        let mut received = Vec::new();
        while let Ok(line) = chan_rx.try_recv() {
            received.push(line);
        }
        assert_eq!(received, vec!["a", "b", "c"]);
        assert!(closed.load(Ordering::Relaxed), "Sender close never ran");
    }

    /// One record fans out to two destinations with different encodings.
    #[tokio::test]
    async fn test_e2e_fanout_encodes_per_destination() {
        let registry = Registry::with_builtins();

        let json_config = DestinationConfig::new("json", "mem+json://a").unwrap();
        let raw_config = DestinationConfig::new("raw", "mem://b").unwrap();

        let mut json_dest = Destination::open(&json_config, &registry).await.unwrap();
        let mut raw_dest = Destination::open(&raw_config, &registry).await.unwrap();

        let mut json_reader = json_dest.take_reader().unwrap();
        let mut raw_reader = raw_dest.take_reader().unwrap();

        let mut destinations = Destinations::new();
        destinations.push(json_dest);
        destinations.push(raw_dest);

        let (tx, rx) = mpsc::channel::<Option<Record>>(16);
        let (done_tx, done_rx) = oneshot::channel();

        let worker = tokio::spawn(async move {
            destinations.consume(rx, done_tx).await;
            destinations.close().await
        });

        tx.send(Some(line_record("hello"))).await.unwrap();
        tx.send(None).await.unwrap();

        assert_eq!(done_rx.await, Ok(true));
        let result = tokio::time::timeout(Duration::from_secs(5), worker).await;
        assert!(result.is_ok(), "Relay worker timed out");
        result.unwrap().unwrap().unwrap();

        let mut json_out = Vec::new();
        json_reader.read_to_end(&mut json_out).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json_out).unwrap();
        assert_eq!(value["line"], "hello");

        let mut raw_out = Vec::new();
        raw_reader.read_to_end(&mut raw_out).await.unwrap();
        assert_eq!(raw_out, b"hello\n");
    }
}
