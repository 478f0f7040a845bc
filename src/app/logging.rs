//! Log subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::ENV_LOG;

/// Install the global subscriber. Logs go to stderr so stdout carries results only.
///
/// `RELIC_LOG` takes standard filter directives (`debug`, `relic_scan::scan=trace`).
/// Without it the level is `info`, or `warn` when `quiet` is set.
pub fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
