//! Rate limiter types and data structures

use crate::utils::error::AdmissionRejection;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Length of the in-process fixed window
pub(super) const LOCAL_WINDOW: Duration = Duration::from_secs(60);

/// Idle expiry of shared buckets, in seconds
pub(super) const BUCKET_TTL_SECS: u64 = 120;

/// Interval of the local window cleanup task
pub(super) const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Admission decision for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdmitDecision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Requests counted against the limit, this one included when allowed
    pub used: u32,
    /// Maximum requests allowed
    pub limit: u32,
    /// Milliseconds until a retry can succeed (0 when allowed)
    pub retry_after_ms: u64,
}

impl AdmitDecision {
    pub(super) fn unlimited(limit: u32) -> Self {
        Self {
            allowed: true,
            used: 0,
            limit,
            retry_after_ms: 0,
        }
    }

    /// Structured rejection for a denied decision
    pub fn rejection(&self) -> Option<AdmissionRejection> {
        (!self.allowed).then(|| AdmissionRejection::rate_limited(self.retry_after_ms))
    }

    /// Requests still available to the caller
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }
}

/// Fixed window counter for one rate key
#[derive(Debug, Clone)]
pub(super) struct LocalWindow {
    pub(super) count: u32,
    pub(super) window_start: Instant,
}

impl LocalWindow {
    pub(super) fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    pub(super) fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.window_start) >= LOCAL_WINDOW
    }

    /// Time left until the window resets
    pub(super) fn remaining(&self, now: Instant) -> Duration {
        LOCAL_WINDOW.saturating_sub(now.saturating_duration_since(self.window_start))
    }
}
