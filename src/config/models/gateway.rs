//! Main gateway configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream provider configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Adaptive limit estimation configuration
    #[serde(default)]
    pub adaptive: AdaptiveConfig,
    /// Upstream concurrency configuration
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Monitoring configuration
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}
