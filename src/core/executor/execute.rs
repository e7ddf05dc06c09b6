//! Unary execution

use crate::core::adaptive::AdaptiveLimitEstimator;
use crate::core::concurrency::{ConcurrencyGate, GatePermit};
use crate::core::providers::ProviderError;
use crate::core::usage::{TokenUsage, UsageSource};
use crate::monitoring::metrics::GatewayMetrics;
use crate::utils::error::{GatewayError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Executes upstream operations under the concurrency gate
#[derive(Debug, Clone)]
pub struct UpstreamExecutor {
    pub(super) gate: Arc<ConcurrencyGate>,
    pub(super) estimator: Arc<AdaptiveLimitEstimator>,
    pub(super) metrics: Arc<GatewayMetrics>,
}

impl UpstreamExecutor {
    pub fn new(
        gate: Arc<ConcurrencyGate>,
        estimator: Arc<AdaptiveLimitEstimator>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            gate,
            estimator,
            metrics,
        }
    }

    pub fn gate(&self) -> &Arc<ConcurrencyGate> {
        &self.gate
    }

    /// Run `op` for `model` with no prompt estimate
    pub async fn execute<T, F, Fut>(&self, model: &str, op: F) -> Result<T>
    where
        T: UsageSource,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, ProviderError>>,
    {
        self.execute_with_estimate(model, 0, op).await
    }

    /// Run `op` for `model` inside a gate slot
    ///
    /// `prompt_estimate` is used for token accounting when the upstream
    /// reports no usage. Upstream errors are returned unchanged and never
    /// retried.
    pub async fn execute_with_estimate<T, F, Fut>(
        &self,
        model: &str,
        prompt_estimate: u64,
        op: F,
    ) -> Result<T>
    where
        T: UsageSource,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, ProviderError>>,
    {
        let permit = self.acquire().await?;
        let started = Instant::now();

        let outcome = op().await;
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(value) => {
                self.on_upstream_success(model, value.usage_or_estimate(prompt_estimate), elapsed);
                Ok(value)
            }
            Err(err) => {
                self.on_upstream_failure(model, &err, elapsed);
                Err(GatewayError::Provider(err))
            }
        };

        drop(permit);
        result
    }

    pub(super) async fn acquire(&self) -> Result<GatePermit> {
        match self.gate.acquire().await {
            Ok(permit) => Ok(permit),
            Err(rejection) => {
                self.metrics.record_error(rejection.reason.as_str());
                Err(rejection.into())
            }
        }
    }

    pub(super) fn on_upstream_success(&self, model: &str, usage: TokenUsage, elapsed: Duration) {
        self.estimator.on_success(model);
        self.metrics.record_tokens(model, usage);
        self.metrics.observe_upstream(model, elapsed);
    }

    pub(super) fn on_upstream_failure(&self, model: &str, err: &ProviderError, elapsed: Duration) {
        record_failure(&self.estimator, &self.metrics, model, err);
        self.metrics.observe_upstream(model, elapsed);
    }
}

/// Account an upstream failure: 429s teach the estimator
pub(super) fn record_failure(
    estimator: &AdaptiveLimitEstimator,
    metrics: &GatewayMetrics,
    model: &str,
    err: &ProviderError,
) {
    let kind = GatewayError::Provider(err.clone()).kind();
    metrics.record_error(kind);

    if err.is_rate_limited() {
        debug!(model = model, "Upstream answered 429");
        estimator.on_reject(model);
        metrics.record_upstream_429(model);
    } else {
        debug!(model = model, status = err.http_status(), "Upstream call failed: {}", err);
    }
}
