//! Monitoring configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Enable metrics collection and the `/metrics` endpoint
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
    /// Record a per-route duration histogram in addition to the global one
    #[serde(default)]
    pub per_route_histograms: bool,
    /// Queue fill ratio above which the gateway reports not ready
    #[serde(default = "default_ready_queue_ratio")]
    pub ready_queue_ratio: f64,
    /// Log level used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            per_route_histograms: false,
            ready_queue_ratio: default_ready_queue_ratio(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}
