//! `schemes` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;

use dispatcher::registry::Registry;

use crate::cli::SchemesArgs;

/// Registered scheme listing for JSON output
#[derive(Serialize)]
struct SchemeListing {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    senders: Vec<String>,
    transports: Vec<String>,
    encoders: Vec<String>,
}

/// Execute the `schemes` command
pub fn run_schemes(args: &SchemesArgs) -> Result<()> {
    let registry = Registry::with_builtins();

    let listing = SchemeListing {
        senders: registry.sender_schemes(),
        transports: registry.transport_schemes(),
        encoders: registry.encoder_suffixes(),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&listing)
            .context("Failed to serialize scheme listing")?;
        println!("{}", json);
    } else {
        print_scheme_listing(&listing);
    }

    Ok(())
}

fn print_scheme_listing(listing: &SchemeListing) {
    if !listing.senders.is_empty() {
        println!("Senders:");
        for scheme in &listing.senders {
            println!("  - {}", scheme);
        }
        println!();
    }

    println!("Transports:");
    for scheme in &listing.transports {
        println!("  - {}", scheme);
    }

    println!("\nEncoders (scheme suffixes, e.g. tcp+json):");
    for suffix in &listing.encoders {
        println!("  - {}", suffix);
    }
    println!("  - raw (implicit when no suffix is given)");
}
