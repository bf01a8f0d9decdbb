//! `check` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::DestinationConfig;
use dispatcher::registry::{Registry, ResolvedRoute};

use crate::cli::CheckArgs;

/// Resolution result for one destination
#[derive(Serialize)]
struct CheckResult {
    name: String,
    address: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<RouteInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct RouteInfo {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    transport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoder: Option<String>,
}

/// Execute the `check` command
pub fn run_check(args: &CheckArgs) -> Result<()> {
    info!(destinations = args.dest.len(), "Resolving destination addresses");

    let registry = Registry::with_builtins();
    let results: Vec<CheckResult> = args
        .dest
        .iter()
        .enumerate()
        .map(|(i, spec)| check_destination(spec, i, &registry))
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&results)
            .context("Failed to serialize check results")?;
        println!("{}", json);
    } else {
        for result in &results {
            print_check_result(result);
        }
    }

    if results.iter().all(|r| r.ok) {
        Ok(())
    } else {
        anyhow::bail!("Destination check failed")
    }
}

fn check_destination(spec: &str, index: usize, registry: &Registry) -> CheckResult {
    let (name, address) = super::split_dest_spec(spec, index);

    let config = match DestinationConfig::new(name.as_str(), address) {
        Ok(config) => config,
        Err(e) => {
            return CheckResult {
                name,
                address: address.to_string(),
                ok: false,
                route: None,
                error: Some(e.to_string()),
            }
        }
    };

    match registry.check(config.scheme()) {
        Ok(route) => CheckResult {
            name,
            address: address.to_string(),
            ok: true,
            route: Some(route_info(&route)),
            error: None,
        },
        Err(e) => CheckResult {
            name,
            address: address.to_string(),
            ok: false,
            route: None,
            error: Some(e.to_string()),
        },
    }
}

fn route_info(route: &ResolvedRoute) -> RouteInfo {
    match route {
        ResolvedRoute::Sender { .. } => RouteInfo {
            kind: "sender",
            transport: None,
            encoder: None,
        },
        ResolvedRoute::Stream { transport, encoder } => RouteInfo {
            kind: "stream",
            transport: Some(transport.clone()),
            encoder: Some(encoder.clone().unwrap_or_else(|| "raw".to_string())),
        },
    }
}

fn print_check_result(result: &CheckResult) {
    if result.ok {
        println!("✓ {} resolves: {}", result.name, result.address);

        if let Some(ref route) = result.route {
            println!("  Kind: {}", route.kind);
            if let Some(ref transport) = route.transport {
                println!("  Transport: {}", transport);
            }
            if let Some(ref encoder) = route.encoder {
                println!("  Encoder: {}", encoder);
            }
        }
    } else {
        println!("✗ {} does not resolve: {}", result.name, result.address);
        if let Some(ref error) = result.error {
            println!("  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_reports_stream_route() {
        let registry = Registry::with_builtins();
        let result = check_destination("errors=tcp+json://collector:9000", 0, &registry);

        assert!(result.ok);
        let route = result.route.unwrap();
        assert_eq!(route.kind, "stream");
        assert_eq!(route.transport.as_deref(), Some("tcp"));
        assert_eq!(route.encoder.as_deref(), Some("json"));
    }

    #[test]
    fn test_check_reports_raw_fallback() {
        let registry = Registry::with_builtins();
        let result = check_destination("file:///var/log/out.log", 0, &registry);

        assert!(result.ok);
        assert_eq!(result.route.unwrap().encoder.as_deref(), Some("raw"));
    }

    #[test]
    fn test_check_flags_unknown_scheme() {
        let registry = Registry::with_builtins();
        let result = check_destination("warp://nowhere:1", 0, &registry);

        assert!(!result.ok);
        assert!(result.error.unwrap().contains("unknown scheme"));
    }

    #[test]
    fn test_check_flags_malformed_address() {
        let registry = Registry::with_builtins();
        let result = check_destination("bad=not a url", 0, &registry);

        assert!(!result.ok);
        assert!(result.route.is_none());
    }
}
