//! Tracing subscriber initialization.

use crate::config::LogConfig;
use crate::error::ApiClientError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "IMT_LOG";

/// Resolve the filter: `IMT_LOG`, then `RUST_LOG`, then the configured directive.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Install the global subscriber. Call once at startup.
pub fn init(config: &LogConfig) -> Result<(), ApiClientError> {
    let registry = tracing_subscriber::registry().with(env_filter(config));
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| ApiClientError::Config(format!("Failed to init subscriber: {}", e)))?;

    tracing::debug!(json = config.json, filter = %config.filter, "Logging initialized");
    Ok(())
}
