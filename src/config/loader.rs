//! Configuration loading utilities
//!
//! Environment variables are applied on top of whatever the YAML file provided.

use super::models::*;
use crate::utils::error::{GatewayError, Result};
use std::env;
use std::str::FromStr;
use tracing::debug;

/// Parse an environment variable into `T`, if present
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| GatewayError::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

impl GatewayConfig {
    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        debug!("Applying configuration overrides from environment variables");

        // Server configuration
        if let Ok(host) = env::var("GATEWAY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_var("GATEWAY_PORT")? {
            self.server.port = port;
        }
        if let Some(workers) = parse_var("GATEWAY_WORKERS")? {
            self.server.workers = Some(workers);
        }

        // Upstream configuration
        if let Ok(api_base) = env::var("UPSTREAM_API_BASE") {
            self.upstream.api_base = api_base;
        }
        if let Ok(api_key) = env::var("UPSTREAM_API_KEY") {
            self.upstream.api_key = Some(api_key);
        }

        // Admission control
        if let Some(enabled) = parse_var("GATEWAY_RATE_LIMIT_ENABLED")? {
            self.rate_limit.enabled = enabled;
        }
        if let Some(base) = parse_var("GATEWAY_BASE_LIMIT_PER_MINUTE")? {
            self.rate_limit.base_limit_per_minute = base;
        }
        if let Some(leeway) = parse_var("GATEWAY_LEEWAY")? {
            self.rate_limit.leeway = leeway;
        }
        if let Some(enabled) = parse_var("GATEWAY_ADAPTIVE_ENABLED")? {
            self.adaptive.enabled = enabled;
        }
        if let Ok(path) = env::var("GATEWAY_ADAPTIVE_SNAPSHOT_PATH") {
            self.adaptive.snapshot_path = if path.is_empty() { None } else { Some(path) };
        }
        if let Some(max) = parse_var("GATEWAY_MAX_CONCURRENT")? {
            self.concurrency.max_concurrent = max;
        }
        if let Some(max) = parse_var("GATEWAY_MAX_QUEUE_LENGTH")? {
            self.concurrency.max_queue_length = max;
        }
        if let Some(timeout) = parse_var("GATEWAY_QUEUE_TIMEOUT_MS")? {
            self.concurrency.queue_timeout_ms = timeout;
        }

        // Redis configuration
        if let Ok(redis_url) = env::var("REDIS_URL") {
            self.storage.redis.url = redis_url;
            self.storage.redis.enabled = true;
        }

        // Monitoring configuration
        if let Some(enabled) = parse_var("GATEWAY_METRICS_ENABLED")? {
            self.monitoring.metrics_enabled = enabled;
        }
        if let Some(json) = parse_var("GATEWAY_JSON_LOGS")? {
            self.monitoring.json_logs = json;
        }

        Ok(())
    }
}
