//! Diagnostic logging for the CLI.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive such as `atlas_nav=debug`.
pub const LOG_ENV: &str = "ATLAS_LOG";

/// Install the stderr subscriber. Call once near the start of `main`.
///
/// `ATLAS_LOG` wins when set; otherwise the level is `warn`, or `debug` with
/// `verbose`.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();
}
