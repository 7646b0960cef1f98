//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::{CirculationConfig, ConfigError};

/// Install the global subscriber described by `config`. `RUST_LOG`, when
/// set, takes precedence over the configured filter.
///
/// # Errors
///
/// `ConfigError::Telemetry` when the filter directive is malformed or a
/// global subscriber is already installed.
pub fn init_tracing(config: &CirculationConfig) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter).map_err(|e| ConfigError::Telemetry(e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ConfigError::Telemetry(e.to_string()))?;

    tracing::debug!(json = config.json_logs, "tracing initialised");
    Ok(())
}
