//! Tracing subscriber setup

use crate::config::MonitoringConfig;
use crate::utils::error::{GatewayError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Build the level filter: `RUST_LOG` wins over the configured level
pub fn env_filter(config: &MonitoringConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, plain text or JSON lines
pub fn init_tracing(config: &MonitoringConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let result = if config.json_logs {
        registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_thread_ids(false))
            .try_init()
    };

    result.map_err(|e| GatewayError::internal(format!("Failed to initialise tracing: {}", e)))?;

    tracing::info!(
        log_level = %config.log_level,
        json = config.json_logs,
        "Tracing initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_falls_back() {
        let config = MonitoringConfig {
            log_level: "not a directive [".to_string(),
            ..MonitoringConfig::default()
        };
        // Must not panic
        let _ = env_filter(&config);
    }
}
