//! Relay metric recording
//!
//! Thin helpers over the `metrics` facade. Callers pass primitives so
//! this crate stays decoupled from the dispatcher's own counter types.

use metrics::{counter, gauge, histogram};

/// Record one produced record entering the relay.
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_record_produced;
///
/// while let Some(line) = lines.next_line().await? {
///     record_record_produced();
///     // ...
/// }
/// ```
pub fn record_record_produced() {
    counter!("record_relay_records_produced_total").increment(1);
}

/// Record a destination's delivery totals, usually from an end-of-run
/// metrics snapshot.
pub fn record_destination_totals(destination: &str, sends: u64, failures: u64) {
    gauge!(
        "record_relay_destination_sends",
        "destination" => destination.to_string()
    )
    .set(sends as f64);

    gauge!(
        "record_relay_destination_failures",
        "destination" => destination.to_string()
    )
    .set(failures as f64);

    if failures > 0 {
        counter!(
            "record_relay_send_failures_total",
            "destination" => destination.to_string()
        )
        .increment(failures);
    }
}

/// Record how long a relay run took, producer start to close.
pub fn record_run_duration(duration_ms: f64) {
    histogram!("record_relay_run_duration_ms").record(duration_ms);
}
