//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};

/// Record Relay - Pluggable record routing dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "record-relay",
    author,
    version,
    about = "Pluggable record routing dispatcher",
    long_about = "A record routing dispatcher with scheme-addressed destinations.\n\n\
                  Reads records from standard input, fans each one out to every \n\
                  configured destination, and encodes them for the wire format the \n\
                  destination's scheme selects (raw, json, statsd)."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RECORD_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RECORD_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Relay records from stdin to the configured destinations
    Run(RunArgs),

    /// Resolve destination addresses without opening them
    Check(CheckArgs),

    /// List the registered schemes
    Schemes(SchemesArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Destination address, optionally named (NAME=SCHEME://HOST/PATH).
    /// Repeat for fan-out to several destinations.
    #[arg(short, long = "dest", value_name = "[NAME=]ADDRESS", required = true)]
    pub dest: Vec<String>,

    /// Extra column attached to every record (KEY=VALUE, integral values
    /// become gauges)
    #[arg(short, long = "field", value_name = "KEY=VALUE")]
    pub field: Vec<String>,

    /// Channel buffer size for the record queue (must be at least 1)
    #[arg(
        long,
        default_value = "100",
        env = "RECORD_RELAY_BUFFER_SIZE",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub buffer_size: usize,

    /// Per-record send deadline in milliseconds (0 = no deadline)
    #[arg(long, default_value = "0", env = "RECORD_RELAY_SEND_TIMEOUT_MS")]
    pub send_timeout_ms: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "RECORD_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `check` command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Destination address to resolve, optionally named
    #[arg(short, long = "dest", value_name = "[NAME=]ADDRESS", required = true)]
    pub dest: Vec<String>,

    /// Output resolution result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `schemes` command
#[derive(Parser, Debug)]
pub struct SchemesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
