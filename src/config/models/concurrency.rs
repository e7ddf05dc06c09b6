//! Upstream concurrency configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Concurrency gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Enable the concurrency gate
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum simultaneous upstream calls
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Maximum number of queued waiters
    #[serde(default = "default_max_queue_length")]
    pub max_queue_length: usize,
    /// Maximum time a waiter may stay queued, in milliseconds
    #[serde(default = "default_queue_timeout_ms")]
    pub queue_timeout_ms: u64,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_concurrent: default_max_concurrent(),
            max_queue_length: default_max_queue_length(),
            queue_timeout_ms: default_queue_timeout_ms(),
        }
    }
}

impl ConcurrencyConfig {
    pub fn queue_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_timeout_ms)
    }
}
