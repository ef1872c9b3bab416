use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::errors::CoreError;

/// Console logging configuration for binaries embedding the core.
///
/// The library itself only emits `tracing` events; installing a subscriber
/// is up to the host application.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"merchant_dashboard_core=debug"`
    pub log_level: String,
    /// Include the event target (module path) in each line
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Uses `RUST_LOG` when set, `info` otherwise.
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ..Self::default()
        }
    }
}

/// Install a global fmt subscriber filtered by `config.log_level`.
///
/// Calling it again after a subscriber is installed returns
/// `CoreError::Config` instead of panicking.
pub fn init_logging(config: &LoggingConfig) -> Result<(), CoreError> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.log_level)
        .map_err(|e| CoreError::Config(format!("Invalid log filter '{}': {e}", config.log_level)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
        .try_init()
        .map_err(|e| CoreError::Config(format!("Logging already initialized: {e}")))?;

    tracing::info!(level = %config.log_level, "Console logging initialized");
    Ok(())
}
