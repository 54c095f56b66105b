//! Diagnostic output setup for the binary
//!
//! The library only emits `tracing` events; installing a subscriber is
//! left to whoever embeds it.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the filter directive (e.g. `tokdash=debug`)
pub const LOG_ENV: &str = "TOKDASH_LOG";

/// Filter from `TOKDASH_LOG`, else `debug` when verbose, else `warn`
pub fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "warn" };
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a stderr fmt subscriber. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
