//! Logging setup
//!
//! `RUST_LOG` takes precedence over the configured level when it is set.

use super::config::{ConfigError, LoggingSettings};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the level filter for the given settings
pub fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, ConfigError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(settings.level.to_lowercase()),
    };
    filter.map_err(|e| ConfigError::Invalid(format!("bad log filter: {}", e)))
}

/// Install the global subscriber.
///
/// A subscriber installed earlier (by a test harness or an embedding application)
/// is left in place.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), ConfigError> {
    let filter = build_filter(settings)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if settings.json_format {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };

    if installed.is_err() {
        tracing::debug!("global subscriber already installed, keeping it");
    }
    Ok(())
}
