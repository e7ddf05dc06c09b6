//! Error types for the Gateway

use super::admission::AdmissionRejection;
use crate::core::providers::ProviderError;
use thiserror::Error;

/// Result type alias for the Gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the Gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Redis errors
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upstream provider errors, carried unchanged
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Admission rejections (rate limit, queue overflow, queue timeout)
    #[error("Admission rejected: {0}")]
    Admission(#[from] AdmissionRejection),

    /// Shared store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad request errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Metrics registry errors
    #[error("Monitoring error: {0}")]
    Monitoring(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}
