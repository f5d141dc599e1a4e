//! Logging setup for the retrox front-end

use crate::config::LogLevel;
use tracing_subscriber::EnvFilter;

/// Build the filter used by the subscriber.
///
/// `RUST_LOG` wins over the configured level so a single run can be traced
/// without editing the config file.
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()))
}

/// Install the global fmt subscriber.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init(level: LogLevel) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .try_init();

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
