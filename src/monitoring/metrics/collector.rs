//! Metrics collector implementation for recording metrics

use super::histogram::{REQUEST_BUCKETS, UPSTREAM_BUCKETS};
use super::types::{LatencySummary, MetricsStorage, MetricsSummary};
use crate::config::MonitoringConfig;
use crate::core::usage::TokenUsage;
use crate::utils::error::{GatewayError, Result};
use parking_lot::RwLock;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::time::{Duration, Instant};
use tracing::debug;

/// Gateway metrics: Prometheus registry plus a summary mirror for `/stats`
#[derive(Debug)]
pub struct GatewayMetrics {
    enabled: bool,
    per_route_histograms: bool,
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: Histogram,
    route_duration: HistogramVec,
    errors_total: IntCounterVec,
    rate_limit_exceeded_total: IntCounter,
    upstream_429_total: IntCounterVec,
    prompt_tokens_total: IntCounterVec,
    completion_tokens_total: IntCounterVec,
    upstream_active: IntGauge,
    queue_length: IntGauge,
    ready: IntGauge,
    queue_wait: Histogram,
    upstream_duration: HistogramVec,
    /// Summary mirror, single lock for all of it
    storage: RwLock<MetricsStorage>,
    start_time: Instant,
}

impl GatewayMetrics {
    /// Create and register all gateway metrics
    pub fn new(config: &MonitoringConfig) -> Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by method, route and status"),
            &["method", "route", "status"],
        )?;
        let request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(REQUEST_BUCKETS.to_vec()),
        )?;
        let route_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_route_duration_seconds",
                "HTTP request duration in seconds by route",
            )
            .buckets(REQUEST_BUCKETS.to_vec()),
            &["route"],
        )?;
        let errors_total = IntCounterVec::new(
            Opts::new("errors_total", "Errors by kind"),
            &["kind"],
        )?;
        let rate_limit_exceeded_total = IntCounter::new(
            "rate_limit_exceeded_total",
            "Requests rejected by the rate limiter",
        )?;
        let upstream_429_total = IntCounterVec::new(
            Opts::new("upstream_429_total", "Upstream rate limit responses by model"),
            &["model"],
        )?;
        let prompt_tokens_total = IntCounterVec::new(
            Opts::new("prompt_tokens_total", "Approximate prompt tokens by model"),
            &["model"],
        )?;
        let completion_tokens_total = IntCounterVec::new(
            Opts::new(
                "completion_tokens_total",
                "Approximate completion tokens by model",
            ),
            &["model"],
        )?;
        let upstream_active = IntGauge::new("upstream_active", "Upstream calls in flight")?;
        let queue_length = IntGauge::new("upstream_queue_length", "Requests waiting for a slot")?;
        let ready = IntGauge::new("gateway_ready", "1 when the gateway reports ready")?;
        let queue_wait = Histogram::with_opts(
            HistogramOpts::new("queue_wait_seconds", "Time spent waiting for a slot")
                .buckets(REQUEST_BUCKETS.to_vec()),
        )?;
        let upstream_duration = HistogramVec::new(
            HistogramOpts::new(
                "upstream_duration_seconds",
                "Upstream call duration in seconds by model",
            )
            .buckets(UPSTREAM_BUCKETS.to_vec()),
            &["model"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(route_duration.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(rate_limit_exceeded_total.clone()))?;
        registry.register(Box::new(upstream_429_total.clone()))?;
        registry.register(Box::new(prompt_tokens_total.clone()))?;
        registry.register(Box::new(completion_tokens_total.clone()))?;
        registry.register(Box::new(upstream_active.clone()))?;
        registry.register(Box::new(queue_length.clone()))?;
        registry.register(Box::new(ready.clone()))?;
        registry.register(Box::new(queue_wait.clone()))?;
        registry.register(Box::new(upstream_duration.clone()))?;

        debug!(
            enabled = config.metrics_enabled,
            per_route = config.per_route_histograms,
            "Metrics registry initialised"
        );

        Ok(Self {
            enabled: config.metrics_enabled,
            per_route_histograms: config.per_route_histograms,
            registry,
            requests_total,
            request_duration,
            route_duration,
            errors_total,
            rate_limit_exceeded_total,
            upstream_429_total,
            prompt_tokens_total,
            completion_tokens_total,
            upstream_active,
            queue_length,
            ready,
            queue_wait,
            upstream_duration,
            storage: RwLock::new(MetricsStorage::default()),
            start_time: Instant::now(),
        })
    }

    /// Check if metrics collection is enabled
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a completed HTTP request
    pub fn record_request(&self, method: &str, route: &str, status: u16, duration: Duration) {
        if !self.enabled {
            return;
        }

        let seconds = duration.as_secs_f64();
        let status_label = status.to_string();
        self.requests_total
            .with_label_values(&[method, route, status_label.as_str()])
            .inc();
        self.request_duration.observe(seconds);
        if self.per_route_histograms {
            self.route_duration.with_label_values(&[route]).observe(seconds);
        }

        let mut storage = self.storage.write();
        storage.total_requests += 1;
        *storage.status_codes.entry(status).or_insert(0) += 1;
        storage.request_duration.observe_secs(seconds);
    }

    /// Record an error by kind
    pub fn record_error(&self, kind: &str) {
        if !self.enabled {
            return;
        }

        self.errors_total.with_label_values(&[kind]).inc();
        *self
            .storage
            .write()
            .error_kinds
            .entry(kind.to_string())
            .or_insert(0) += 1;
    }

    /// Record a rate limiter rejection
    pub fn record_rate_limited(&self) {
        if !self.enabled {
            return;
        }

        self.rate_limit_exceeded_total.inc();
        self.storage.write().rate_limit_exceeded += 1;
    }

    /// Record an upstream 429 for a model
    pub fn record_upstream_429(&self, model: &str) {
        if !self.enabled {
            return;
        }

        self.upstream_429_total.with_label_values(&[model]).inc();
        *self
            .storage
            .write()
            .upstream_429
            .entry(model.to_string())
            .or_insert(0) += 1;
    }

    /// Add prompt and completion tokens for a model
    pub fn record_tokens(&self, model: &str, usage: TokenUsage) {
        if !self.enabled || (usage.prompt_tokens == 0 && usage.completion_tokens == 0) {
            return;
        }

        self.prompt_tokens_total
            .with_label_values(&[model])
            .inc_by(usage.prompt_tokens);
        self.completion_tokens_total
            .with_label_values(&[model])
            .inc_by(usage.completion_tokens);

        let mut storage = self.storage.write();
        let entry = storage.tokens.entry(model.to_string()).or_default();
        entry.prompt_tokens += usage.prompt_tokens;
        entry.completion_tokens += usage.completion_tokens;
    }

    /// Record an upstream call duration for a model
    pub fn observe_upstream(&self, model: &str, duration: Duration) {
        if !self.enabled {
            return;
        }

        self.upstream_duration
            .with_label_values(&[model])
            .observe(duration.as_secs_f64());
    }

    /// Record how long a request waited for a concurrency slot
    pub fn observe_queue_wait(&self, seconds: f64) {
        if !self.enabled {
            return;
        }

        self.queue_wait.observe(seconds);
        self.storage.write().queue_wait.observe_secs(seconds);
    }

    /// Refresh the gate gauges
    pub fn set_gate_gauges(&self, active: usize, queue_length: usize) {
        self.upstream_active.set(active as i64);
        self.queue_length.set(queue_length as i64);
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(i64::from(ready));
    }

    pub fn is_ready(&self) -> bool {
        self.ready.get() == 1
    }

    /// Prometheus text exposition of all registered metrics
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| GatewayError::monitoring(e.to_string()))
    }

    /// Structured snapshot with p95/p99 latencies
    pub fn summary(&self) -> MetricsSummary {
        let storage = self.storage.read();

        MetricsSummary {
            uptime_secs: self.start_time.elapsed().as_secs(),
            requests_total: storage.total_requests,
            requests_by_status: storage
                .status_codes
                .iter()
                .map(|(status, count)| (*status, *count))
                .collect(),
            errors_by_kind: storage
                .error_kinds
                .iter()
                .map(|(kind, count)| (kind.clone(), *count))
                .collect(),
            rate_limit_exceeded_total: storage.rate_limit_exceeded,
            upstream_429_by_model: storage
                .upstream_429
                .iter()
                .map(|(model, count)| (model.clone(), *count))
                .collect(),
            tokens_by_model: storage
                .tokens
                .iter()
                .map(|(model, usage)| (model.clone(), *usage))
                .collect(),
            upstream_active: self.upstream_active.get(),
            queue_length: self.queue_length.get(),
            ready: self.is_ready(),
            request_latency: LatencySummary::from(&storage.request_duration),
            queue_wait: LatencySummary::from(&storage.queue_wait),
        }
    }
}
