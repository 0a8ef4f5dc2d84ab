//! Tracing subscriber setup for hosts embedding the engine

use tracing_subscriber::{self, EnvFilter};

/// Install a stderr fmt subscriber filtered by `RUST_LOG`
///
/// `default_directive` (e.g. `"decider_core=info"`) applies when `RUST_LOG`
/// is unset or invalid. Returns false if a global subscriber already exists.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
