//! Command implementations.

mod check;
mod run;
mod schemes;

pub use check::run_check;
pub use run::run_relay;
pub use schemes::run_schemes;

/// Split a `[NAME=]ADDRESS` destination spec. Unnamed destinations are
/// named `dest-N` from their one-based position.
pub(crate) fn split_dest_spec(spec: &str, index: usize) -> (String, &str) {
    match spec.split_once('=') {
        // An '=' can also belong to the address query string; only a
        // prefix without "://" is a name.
        Some((name, address)) if !name.contains("://") => (name.to_string(), address),
        _ => (format!("dest-{}", index + 1), spec),
    }
}
