//! Readiness probe
//!
//! Ready means the shared store (when configured) answers PING and the
//! upstream queue sits below its high-water mark. The result feeds the
//! `gateway_ready` gauge and `GET /ready`; requests are never blocked by it.

use crate::core::concurrency::ConcurrencyGate;
use crate::monitoring::metrics::GatewayMetrics;
use crate::storage::SharedBucketStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Interval of the readiness refresh task
const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Outcome of one readiness check
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReadinessReport {
    pub ready: bool,
    /// `None` when no shared store is configured
    pub store_reachable: Option<bool>,
    pub queue_length: usize,
    /// Queue length at which the gateway stops reporting ready
    pub queue_high_water: Option<f64>,
}

/// Periodically evaluates readiness and publishes it
#[derive(Debug)]
pub struct ReadinessProbe {
    store: Option<Arc<dyn SharedBucketStore>>,
    gate: Arc<ConcurrencyGate>,
    metrics: Arc<GatewayMetrics>,
    queue_ratio: f64,
}

impl ReadinessProbe {
    pub fn new(
        store: Option<Arc<dyn SharedBucketStore>>,
        gate: Arc<ConcurrencyGate>,
        metrics: Arc<GatewayMetrics>,
        queue_ratio: f64,
    ) -> Self {
        Self {
            store,
            gate,
            metrics,
            queue_ratio,
        }
    }

    fn high_water(&self) -> Option<f64> {
        let max_queue = self.gate.max_queue_length();
        (self.gate.is_enabled() && max_queue > 0).then(|| self.queue_ratio * max_queue as f64)
    }

    /// Evaluate readiness now
    pub async fn check(&self) -> ReadinessReport {
        let store_reachable = match &self.store {
            Some(store) => Some(match store.ping().await {
                Ok(()) => true,
                Err(e) => {
                    debug!("Shared store ping failed: {}", e);
                    false
                }
            }),
            None => None,
        };

        let queue_length = self.gate.queue_len();
        let queue_high_water = self.high_water();
        let queue_ok = queue_high_water.is_none_or(|mark| (queue_length as f64) < mark);

        ReadinessReport {
            ready: store_reachable.unwrap_or(true) && queue_ok,
            store_reachable,
            queue_length,
            queue_high_water,
        }
    }

    /// Evaluate readiness and publish it to the gauge
    pub async fn refresh(&self) -> ReadinessReport {
        let report = self.check().await;
        let was_ready = self.metrics.is_ready();
        self.metrics.set_ready(report.ready);
        if was_ready && !report.ready {
            warn!(
                store_reachable = ?report.store_reachable,
                queue_length = report.queue_length,
                "Gateway no longer ready"
            );
        }
        report
    }

    /// Start background refresh task
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(REFRESH_INTERVAL);
            loop {
                interval.tick().await;
                self.refresh().await;
            }
        })
    }
}
