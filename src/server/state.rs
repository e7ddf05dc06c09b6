//! Application state shared across HTTP handlers
//!
//! This module wires the admission components together from configuration.

use crate::config::Config;
use crate::core::adaptive::AdaptiveLimitEstimator;
use crate::core::concurrency::ConcurrencyGate;
use crate::core::executor::UpstreamExecutor;
use crate::core::providers::{OpenAICompatibleProvider, UpstreamProvider};
use crate::core::rate_limiter::RateLimiter;
use crate::monitoring::{GatewayMetrics, ReadinessProbe};
use crate::storage::{SharedBucketStore, connect_bucket_store};
use crate::utils::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// HTTP server state shared across handlers
///
/// All fields are wrapped in Arc for efficient sharing across workers.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Upstream chat completion backend
    pub provider: Arc<dyn UpstreamProvider>,
    pub rate_limiter: Arc<RateLimiter>,
    pub estimator: Arc<AdaptiveLimitEstimator>,
    pub executor: UpstreamExecutor,
    pub metrics: Arc<GatewayMetrics>,
    pub readiness: Arc<ReadinessProbe>,
}

impl AppState {
    /// Build the state from configuration, connecting the shared store and
    /// warming the estimator from its snapshot
    pub async fn new(config: Config) -> Result<Self> {
        let provider = OpenAICompatibleProvider::new(config.upstream())?;
        let store = connect_bucket_store(&config.storage().redis).await;

        let state = Self::with_parts(config, Arc::new(provider), store)?;
        state.load_snapshot().await;
        Ok(state)
    }

    /// Build the state around an existing provider and store
    pub fn with_parts(
        config: Config,
        provider: Arc<dyn UpstreamProvider>,
        store: Option<Arc<dyn SharedBucketStore>>,
    ) -> Result<Self> {
        let metrics = Arc::new(GatewayMetrics::new(config.monitoring())?);
        let estimator = Arc::new(AdaptiveLimitEstimator::new(config.adaptive().clone()));
        let gate = Arc::new(
            ConcurrencyGate::new(config.concurrency().clone()).with_metrics(Arc::clone(&metrics)),
        );
        let rate_limiter = Arc::new(
            RateLimiter::new(
                config.rate_limit().clone(),
                Arc::clone(&estimator),
                store.clone(),
            )
            .with_metrics(Arc::clone(&metrics)),
        );
        let executor = UpstreamExecutor::new(
            Arc::clone(&gate),
            Arc::clone(&estimator),
            Arc::clone(&metrics),
        );
        let readiness = Arc::new(ReadinessProbe::new(
            store,
            gate,
            Arc::clone(&metrics),
            config.monitoring().ready_queue_ratio,
        ));

        debug!(
            provider = provider.name(),
            shared_store = rate_limiter.has_shared_store(),
            "Application state assembled"
        );

        Ok(Self {
            config: Arc::new(config),
            provider,
            rate_limiter,
            estimator,
            executor,
            metrics,
            readiness,
        })
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot file of the estimator, when persistence applies
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        let adaptive = self.config.adaptive();
        if !adaptive.enabled {
            return None;
        }
        adaptive.snapshot_path.as_ref().map(PathBuf::from)
    }

    /// Seed the estimator from its snapshot; never fatal
    pub async fn load_snapshot(&self) {
        if let Some(path) = self.snapshot_path() {
            let seeded = self.estimator.load_snapshot(&path).await;
            info!("Adaptive estimator warmed with {} model(s)", seeded);
        }
    }

    /// Persist the estimator, used on shutdown
    pub async fn save_snapshot(&self) {
        let Some(path) = self.snapshot_path() else {
            return;
        };
        match self.estimator.save_snapshot(&path).await {
            Ok(()) => info!("Saved adaptive snapshot to {}", path.display()),
            Err(e) => warn!("Failed to save adaptive snapshot on shutdown: {}", e),
        }
    }

    /// Abort housekeeping tasks and wait until each has stopped
    ///
    /// A snapshot save in flight finishes or is dropped before this returns,
    /// so the shutdown save is the only writer left.
    pub async fn stop_background_tasks(tasks: Vec<JoinHandle<()>>) {
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            match task.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => warn!("Background task failed during shutdown: {}", e),
            }
        }
        debug!("Background tasks stopped");
    }

    /// Spawn housekeeping: window cleanup, snapshot saving and readiness refresh
    pub fn start_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut tasks = Vec::new();

        if self.rate_limiter.is_enabled() {
            tasks.push(Arc::clone(&self.rate_limiter).start_cleanup_task());
        }
        if let Some(path) = self.snapshot_path() {
            tasks.push(Arc::clone(&self.estimator).start_snapshot_task(path));
        }
        tasks.push(Arc::clone(&self.readiness).start());

        debug!("Started {} background task(s)", tasks.len());
        tasks
    }
}

