//! Logging setup shared by both binaries.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Filter used when `RUST_LOG` is unset and `--verbose` is off.
const DEFAULT_FILTER: &str = "warn";

/// Filter used when `RUST_LOG` is unset and `--verbose` is on.
const VERBOSE_FILTER: &str = "warn,p2pack=debug,p2pack_cli=debug";

/// Build the log filter: `RUST_LOG` wins, otherwise `verbose` picks the level.
pub fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        })
    })
}

/// Install a stderr fmt subscriber as the global default.
pub fn init_logging(verbose: bool) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let subscriber = tracing_subscriber::registry()
        .with(log_filter(verbose))
        .with(layer);

    // Try to set as global default (ignore error if already set)
    let _ = tracing::subscriber::set_global_default(subscriber);
}
