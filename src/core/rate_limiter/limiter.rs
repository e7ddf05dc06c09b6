//! Core rate limiter implementation

use super::types::{AdmitDecision, LocalWindow};
use super::utils::rate_key;
use crate::config::RateLimitConfig;
use crate::core::adaptive::{AdaptiveLimitEstimator, is_concrete_model};
use crate::monitoring::metrics::GatewayMetrics;
use crate::storage::SharedBucketStore;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rate limiter implementation
#[derive(Debug)]
pub struct RateLimiter {
    /// Rate limit configuration
    pub(super) config: RateLimitConfig,
    /// Source of per-model capacity guesses
    pub(super) estimator: Arc<AdaptiveLimitEstimator>,
    /// Shared token bucket store, when configured
    pub(super) store: Option<Arc<dyn SharedBucketStore>>,
    /// In-process fallback windows by rate key
    pub(super) windows: DashMap<String, LocalWindow>,
    pub(super) metrics: Option<Arc<GatewayMetrics>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(
        config: RateLimitConfig,
        estimator: Arc<AdaptiveLimitEstimator>,
        store: Option<Arc<dyn SharedBucketStore>>,
    ) -> Self {
        Self {
            config,
            estimator,
            store,
            windows: DashMap::new(),
            metrics: None,
        }
    }

    /// Count rejections in the given metrics
    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Decide whether `identity` may send one more request to `model`
    ///
    /// Shared store failures are logged and fall back to the local window;
    /// they never reach the caller.
    pub async fn admit(&self, identity: &str, model: &str) -> AdmitDecision {
        if !self.config.enabled {
            return AdmitDecision::unlimited(self.config.local_limit());
        }

        let key = rate_key(identity, model);
        let decision = match &self.store {
            Some(store) => match self.admit_shared(store.as_ref(), &key, model).await {
                Ok(decision) => decision,
                Err(e) => {
                    warn!(
                        error = %e,
                        "Shared store unavailable, rate limiting in degraded local mode"
                    );
                    self.admit_local(&key)
                }
            },
            None => self.admit_local(&key),
        };

        if !decision.allowed {
            self.on_rejected(model, &decision);
        }
        decision
    }

    fn on_rejected(&self, model: &str, decision: &AdmitDecision) {
        debug!(
            model = model,
            limit = decision.limit,
            retry_after_ms = decision.retry_after_ms,
            "Request rate limited"
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_rate_limited();
        }
        if is_concrete_model(model) {
            self.estimator.on_reject(model);
        }
    }
}
