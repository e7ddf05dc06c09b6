//! Upstream provider error type
//!
//! | Variant | Purpose | HTTP Status |
//! |------|------|------------|
//! | RateLimit | Upstream answered 429 | 429 |
//! | ApiError | Any other non-2xx answer | upstream status |
//! | Network | Connection failure | 502 |
//! | Timeout | Upstream did not answer in time | 504 |
//! | ResponseParsing | Upstream body was not valid JSON | 502 |
//! | Streaming | Stream broke mid-flight | 502 |
//! | Configuration | Client could not be built | 500 |

use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;

/// Error produced by an upstream chat completion call
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Rate limit exceeded for {provider}: {message}")]
    RateLimit {
        provider: &'static str,
        message: String,
        retry_after: Option<u64>,
    },

    #[error("API error from {provider} (status {status}): {message}")]
    ApiError {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Network error for {provider}: {message}")]
    Network {
        provider: &'static str,
        message: String,
    },

    #[error("Request to {provider} timed out: {message}")]
    Timeout {
        provider: &'static str,
        message: String,
    },

    #[error("Failed to parse response from {provider}: {message}")]
    ResponseParsing {
        provider: &'static str,
        message: String,
    },

    #[error("Streaming error from {provider}: {message}")]
    Streaming {
        provider: &'static str,
        message: String,
    },

    #[error("Configuration error for {provider}: {message}")]
    Configuration {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn rate_limit(
        provider: &'static str,
        message: impl Into<String>,
        retry_after: Option<u64>,
    ) -> Self {
        Self::RateLimit {
            provider,
            message: message.into(),
            retry_after,
        }
    }

    pub fn api_error(provider: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider,
            status,
            message: message.into(),
        }
    }

    pub fn network(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Network {
            provider,
            message: message.into(),
        }
    }

    pub fn timeout(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider,
            message: message.into(),
        }
    }

    pub fn response_parsing(provider: &'static str, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider,
            message: message.into(),
        }
    }

    pub fn streaming(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Streaming {
            provider,
            message: message.into(),
        }
    }

    pub fn configuration(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider,
            message: message.into(),
        }
    }

    /// Build an error from a non-2xx upstream answer
    pub fn from_status(provider: &'static str, status: u16, headers: &HeaderMap, body: &str) -> Self {
        let message = extract_error_message(body);
        if status == 429 {
            Self::rate_limit(provider, message, parse_retry_after(headers))
        } else {
            Self::api_error(provider, status, message)
        }
    }

    /// Map a transport error, keeping the provider name
    pub fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(provider, err.to_string())
        } else if err.is_decode() {
            Self::response_parsing(provider, err.to_string())
        } else {
            Self::network(provider, err.to_string())
        }
    }

    /// Provider that produced this error
    pub fn provider(&self) -> &'static str {
        match self {
            Self::RateLimit { provider, .. }
            | Self::ApiError { provider, .. }
            | Self::Network { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::Streaming { provider, .. }
            | Self::Configuration { provider, .. } => provider,
        }
    }

    /// HTTP status carried by this failure
    pub fn http_status(&self) -> u16 {
        match self {
            Self::RateLimit { .. } => 429,
            Self::ApiError { status, .. } => *status,
            Self::Network { .. } => 502,
            Self::Timeout { .. } => 504,
            Self::ResponseParsing { .. } | Self::Streaming { .. } => 502,
            Self::Configuration { .. } => 500,
        }
    }

    /// Whether the upstream told us we are over its rate limit
    pub fn is_rate_limited(&self) -> bool {
        self.http_status() == 429
    }

    /// Retry hint from the upstream, in seconds
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to the raw text
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.chars().take(512).collect()
            }
        })
}

/// Longest retry hint taken from an upstream, in seconds
const MAX_RETRY_AFTER_SECS: f64 = 86_400.0;

/// Parse a `Retry-After` header given in seconds, capped at one day
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.min(MAX_RETRY_AFTER_SECS).ceil() as u64)
}
