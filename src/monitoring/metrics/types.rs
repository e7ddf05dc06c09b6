//! Types for metrics storage and summaries

use super::histogram::{DurationHistogram, REQUEST_BUCKETS};
use crate::core::usage::TokenUsage;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Point-in-time mirror of the counters the JSON summary reports
#[derive(Debug)]
pub(super) struct MetricsStorage {
    pub(super) total_requests: u64,
    pub(super) status_codes: HashMap<u16, u64>,
    pub(super) error_kinds: HashMap<String, u64>,
    pub(super) rate_limit_exceeded: u64,
    pub(super) upstream_429: HashMap<String, u64>,
    pub(super) tokens: HashMap<String, TokenUsage>,
    pub(super) request_duration: DurationHistogram,
    pub(super) queue_wait: DurationHistogram,
}

impl Default for MetricsStorage {
    fn default() -> Self {
        Self {
            total_requests: 0,
            status_codes: HashMap::new(),
            error_kinds: HashMap::new(),
            rate_limit_exceeded: 0,
            upstream_429: HashMap::new(),
            tokens: HashMap::new(),
            request_duration: DurationHistogram::new(REQUEST_BUCKETS),
            queue_wait: DurationHistogram::new(REQUEST_BUCKETS),
        }
    }
}

/// Latency digest derived from a histogram
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatencySummary {
    pub count: u64,
    pub mean_secs: Option<f64>,
    pub p95_secs: Option<f64>,
    pub p99_secs: Option<f64>,
}

impl From<&DurationHistogram> for LatencySummary {
    fn from(hist: &DurationHistogram) -> Self {
        Self {
            count: hist.count(),
            mean_secs: hist.mean(),
            p95_secs: hist.quantile(0.95),
            p99_secs: hist.quantile(0.99),
        }
    }
}

/// Structured snapshot of the gateway metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub uptime_secs: u64,
    pub requests_total: u64,
    pub requests_by_status: BTreeMap<u16, u64>,
    pub errors_by_kind: BTreeMap<String, u64>,
    pub rate_limit_exceeded_total: u64,
    pub upstream_429_by_model: BTreeMap<String, u64>,
    pub tokens_by_model: BTreeMap<String, TokenUsage>,
    pub upstream_active: i64,
    pub queue_length: i64,
    pub ready: bool,
    pub request_latency: LatencySummary,
    pub queue_wait: LatencySummary,
}
