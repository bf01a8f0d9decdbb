//! `run` command implementation.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use contracts::{Column, DestinationConfig, Record};
use dispatcher::destination::Destinations;
use dispatcher::registry::Registry;

use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    let configs = parse_dest_specs(&args.dest)?;
    let base_columns = parse_field_specs(&args.field)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let registry = Registry::with_builtins();

    info!(destinations = configs.len(), "Opening destinations");
    let mut destinations = Destinations::open(&configs, &registry)
        .await
        .context("Failed to open destinations")?;

    if args.send_timeout_ms != 0 {
        destinations =
            destinations.with_send_timeout(Duration::from_millis(args.send_timeout_ms));
    }

    let (tx, rx) = mpsc::channel::<Option<Record>>(args.buffer_size);
    let (done_tx, done_rx) = oneshot::channel::<bool>();

    // The worker owns the destination set until the stream ends, then
    // hands it back for the summary.
    let worker = tokio::spawn(async move {
        destinations.consume(rx, done_tx).await;
        let close_result = destinations.close().await;
        (destinations, close_result)
    });

    info!("Relaying records from stdin (Ctrl+C to stop)");

    let start = Instant::now();
    let produced = produce_from_stdin(&tx, &base_columns).await;

    // End-of-stream sentinel; the worker may already be gone
    let _ = tx.send(None).await;
    drop(tx);

    done_rx.await.ok();
    let (destinations, close_result) = worker.await.context("Relay worker panicked")?;

    let elapsed = start.elapsed();
    observability::record_run_duration(elapsed.as_millis() as f64);
    for (name, snapshot) in destinations.metrics() {
        observability::record_destination_totals(
            &name,
            snapshot.send_count,
            snapshot.failure_count,
        );
    }

    print_run_summary(produced, elapsed, &destinations);

    close_result.context("Failed to close destinations")?;

    info!("Record Relay finished");
    Ok(())
}

/// Read stdin line by line and push one record per line, until EOF or a
/// shutdown signal. Returns the number of records produced.
async fn produce_from_stdin(
    tx: &mpsc::Sender<Option<Record>>,
    base_columns: &[(String, Column)],
) -> u64 {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut produced: u64 = 0;

    let shutdown = setup_shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let next = tokio::select! {
            next = lines.next_line() => next,
            _ = &mut shutdown => {
                warn!("Received shutdown signal, stopping relay...");
                break;
            }
        };

        let line = match next {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read stdin, stopping relay");
                break;
            }
        };

        let mut record: Record = base_columns.iter().cloned().collect();
        record.insert("line", Column::String(line));

        if tx.send(Some(record)).await.is_err() {
            // Worker gone, nothing left to deliver to
            break;
        }
        observability::record_record_produced();
        produced += 1;
    }

    produced
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Parse `[NAME=]ADDRESS` destination specs into configs
fn parse_dest_specs(specs: &[String]) -> Result<Vec<DestinationConfig>> {
    let mut configs = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        let (name, address) = super::split_dest_spec(spec, i);
        let config = DestinationConfig::new(name.as_str(), address)
            .with_context(|| format!("Invalid destination spec '{}'", spec))?;
        configs.push(config);
    }
    Ok(configs)
}

/// Parse `KEY=VALUE` field specs. Integral values become gauge columns,
/// everything else stays a string.
fn parse_field_specs(specs: &[String]) -> Result<Vec<(String, Column)>> {
    let mut columns = Vec::with_capacity(specs.len());
    for spec in specs {
        let (key, value) = spec
            .split_once('=')
            .with_context(|| format!("Invalid field spec '{}', expected KEY=VALUE", spec))?;
        let column = match value.parse::<i64>() {
            Ok(n) => Column::Gauge(n),
            Err(_) => Column::String(value.to_string()),
        };
        columns.push((key.to_string(), column));
    }
    Ok(columns)
}

/// Print the delivery summary after the relay finishes
fn print_run_summary(produced: u64, elapsed: Duration, destinations: &Destinations) {
    println!("\n=== Relay Summary ===\n");
    println!("Records produced: {}", produced);
    println!("Elapsed: {:.2}s", elapsed.as_secs_f64());

    println!("\nDestinations ({}):", destinations.len());
    for (name, snapshot) in destinations.metrics() {
        println!(
            "  - {}: {} sent, {} failed",
            name, snapshot.send_count, snapshot.failure_count
        );
    }

    println!();
}
