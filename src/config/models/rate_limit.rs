//! Rate limiting configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base requests per minute for every identity/model pair
    #[serde(default = "default_base_limit_per_minute")]
    pub base_limit_per_minute: u32,
    /// Extra burst allowance added on top of the effective limit
    #[serde(default = "default_leeway")]
    pub leeway: u32,
    /// Key prefix used in the shared store
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_limit_per_minute: default_base_limit_per_minute(),
            leeway: default_leeway(),
            key_prefix: default_key_prefix(),
        }
    }
}

impl RateLimitConfig {
    /// Limit enforced by the in-process fixed window
    pub fn local_limit(&self) -> u32 {
        self.base_limit_per_minute.saturating_add(self.leeway)
    }

    /// Bucket capacity for the shared store given an optional adaptive guess
    pub fn bucket_capacity(&self, guess: Option<u32>) -> u32 {
        let effective = match guess {
            Some(guess) => self.base_limit_per_minute.min(guess),
            None => self.base_limit_per_minute,
        };
        effective.saturating_add(self.leeway)
    }

    /// Tokens restored per second
    pub fn refill_per_second(&self) -> f64 {
        f64::from(self.base_limit_per_minute) / 60.0
    }
}
