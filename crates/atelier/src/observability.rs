//! Logging initialization for the atelier binary.

use crate::LoggingSection;
use atelier_error::{AtelierResult, ConfigError};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the log filter.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` wins over the configured
/// level.
pub fn log_filter(logging: &LoggingSection, verbose: bool) -> AtelierResult<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::new("debug"));
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| {
            ConfigError::new(format!("Invalid log level '{}': {}", logging.level, e)).into()
        })
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns a configuration error if the level is not a valid filter or a
/// subscriber is already installed.
pub fn init_logging(logging: &LoggingSection, verbose: bool) -> AtelierResult<()> {
    let filter = log_filter(logging, verbose)?;

    let fmt_layer = if logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}
