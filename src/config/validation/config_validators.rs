//! Core configuration validators
//!
//! This module provides validation implementations for the main gateway configuration
//! structures including GatewayConfig, ServerConfig, and UpstreamConfig.

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating gateway configuration");

        self.server.validate()?;
        self.upstream.validate()?;
        self.rate_limit.validate()?;
        self.adaptive.validate()?;
        self.concurrency.validate()?;
        self.storage.validate()?;
        self.monitoring.validate()?;

        debug!("Gateway configuration validation completed");
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating server configuration");

        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Worker count must be greater than 0".to_string());
            }
            if workers > 1000 {
                return Err("Worker count seems too high (>1000)".to_string());
            }
        }

        if self.timeout == 0 {
            return Err("Server timeout must be greater than 0".to_string());
        }

        if self.timeout > 3600 {
            return Err("Server timeout should not exceed 1 hour".to_string());
        }

        if self.max_body_size == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for UpstreamConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating upstream configuration");

        let parsed = url::Url::parse(&self.api_base)
            .map_err(|e| format!("Invalid upstream api_base '{}': {}", self.api_base, e))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!(
                "Upstream api_base must use http or https, got '{}'",
                parsed.scheme()
            ));
        }

        if self.timeout == 0 {
            return Err("Upstream timeout must be greater than 0".to_string());
        }

        if matches!(&self.api_key, Some(key) if key.trim().is_empty()) {
            return Err("Upstream api_key cannot be blank when set".to_string());
        }

        Ok(())
    }
}
