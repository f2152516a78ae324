//! # Telemetry
//!
//! Structured logging setup.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages everywhere
//! - `RUST_LOG=stockwise_runtime=trace` - Trace the runtime only
//! - Default: [`DEFAULT_LOG_FILTER`]

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset and no config filter is given.
pub const DEFAULT_LOG_FILTER: &str = "info,stockwise=debug";

/// Installs a fmt subscriber filtered by `RUST_LOG`, else `default_filter`.
///
/// Returns `false` if a global subscriber was already installed, so it is
/// safe to call from every binary and test entry point.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
