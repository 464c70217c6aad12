//! Diagnostic logging on stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `BC_LOG=debug`.
pub const LOG_ENV_VAR: &str = "BC_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. Safe to call more than once.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}
