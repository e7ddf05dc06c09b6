//! Structured admission rejections
//!
//! Admission rejections are produced locally, before any upstream work is
//! committed, and always carry a retry hint for the caller.

use actix_web::http::StatusCode;
use serde::Serialize;
use std::fmt;

/// Why a request was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The caller exhausted its per-model request budget
    RateLimitExceeded,
    /// The upstream wait queue is full
    QueueOverflow,
    /// The request waited in the queue longer than the configured timeout
    QueueTimeout,
}

impl RejectionReason {
    /// Machine-readable reason code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::QueueOverflow => "queue_overflow",
            Self::QueueTimeout => "queue_timeout",
        }
    }

    /// HTTP status the router surfaces for this reason
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::QueueOverflow | Self::QueueTimeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected admission with its retry hint
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}: retry after {retry_after_ms}ms")]
pub struct AdmissionRejection {
    /// Reason code
    pub reason: RejectionReason,
    /// Suggested delay before retrying, in milliseconds
    pub retry_after_ms: u64,
}

impl AdmissionRejection {
    pub fn rate_limited(retry_after_ms: u64) -> Self {
        Self {
            reason: RejectionReason::RateLimitExceeded,
            retry_after_ms,
        }
    }

    pub fn queue_overflow(retry_after_ms: u64) -> Self {
        Self {
            reason: RejectionReason::QueueOverflow,
            retry_after_ms,
        }
    }

    pub fn queue_timeout(retry_after_ms: u64) -> Self {
        Self {
            reason: RejectionReason::QueueTimeout,
            retry_after_ms,
        }
    }

    /// Retry hint rounded up to whole seconds, for the `Retry-After` header
    pub fn retry_after_secs(&self) -> u64 {
        self.retry_after_ms.div_ceil(1000).max(1)
    }
}
