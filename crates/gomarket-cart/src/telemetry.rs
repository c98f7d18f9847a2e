//! Logging setup for binaries and tests that embed the cart.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,gomarket=debug,sqlx=warn";

/// Installs the global tracing subscriber.
///
/// Reads `RUST_LOG` (falls back to [`DEFAULT_LOG_FILTER`]). Returns false if
/// a subscriber was already installed, so calling it twice is harmless.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
