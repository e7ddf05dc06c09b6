//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

pub mod adaptive;
pub mod concurrency;
pub mod gateway;
pub mod monitoring;
pub mod rate_limit;
pub mod server;
pub mod storage;
pub mod upstream;

// Re-export all configuration types
pub use adaptive::*;
pub use concurrency::*;
pub use gateway::*;
pub use monitoring::*;
pub use rate_limit::*;
pub use server::*;
pub use storage::*;
pub use upstream::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default request timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

pub fn default_true() -> bool {
    true
}

pub fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_upstream_timeout() -> u64 {
    120
}

pub fn default_base_limit_per_minute() -> u32 {
    60
}

pub fn default_leeway() -> u32 {
    5
}

pub fn default_key_prefix() -> String {
    "ratelimit".to_string()
}

pub fn default_initial_guess() -> u32 {
    60
}

pub fn default_snapshot_path() -> Option<String> {
    Some("data/adaptive_limits.json".to_string())
}

pub fn default_snapshot_interval() -> u64 {
    600 // 10 minutes
}

pub fn default_snapshot_max_age() -> u64 {
    86_400 // 24 hours
}

pub fn default_max_concurrent() -> usize {
    8
}

pub fn default_max_queue_length() -> usize {
    100
}

pub fn default_queue_timeout_ms() -> u64 {
    30_000
}

pub fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

pub fn default_redis_timeout_ms() -> u64 {
    250
}

pub fn default_ready_queue_ratio() -> f64 {
    0.8
}

pub fn default_log_level() -> String {
    "info".to_string()
}
