//! Adaptive limit estimator

use super::is_concrete_model;
use super::types::{AdaptiveModelState, AdaptiveModelView};
use crate::config::AdaptiveConfig;
use crate::utils::current_timestamp_millis;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Per-model requests-per-minute estimator fed by upstream outcomes
#[derive(Debug)]
pub struct AdaptiveLimitEstimator {
    pub(super) config: AdaptiveConfig,
    pub(super) models: Mutex<HashMap<String, AdaptiveModelState>>,
}

impl AdaptiveLimitEstimator {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self {
            config,
            models: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Current guess for a model
    ///
    /// `None` when estimation is disabled. A model never observed reports its
    /// heuristic initial value without creating state.
    pub fn guess(&self, model: &str) -> Option<u32> {
        if !self.config.enabled {
            return None;
        }

        let learned = self.models.lock().get(model).map(|state| state.guess);
        Some(learned.unwrap_or_else(|| self.initial_guess(model)))
    }

    /// Record a successful upstream call
    pub fn on_success(&self, model: &str) {
        self.on_success_at(model, Instant::now());
    }

    pub(crate) fn on_success_at(&self, model: &str, now: Instant) {
        if !self.config.enabled || !is_concrete_model(model) {
            return;
        }

        let wall_ms = current_timestamp_millis();
        let mut models = self.models.lock();
        let state = self.state_entry(&mut models, model, now, wall_ms);
        if state.record_success(now, wall_ms) {
            debug!(model, guess = state.guess, "Adaptive limit raised");
        }
    }

    /// Record an upstream (or local) rate limit rejection
    pub fn on_reject(&self, model: &str) {
        self.on_reject_at(model, Instant::now());
    }

    pub(crate) fn on_reject_at(&self, model: &str, now: Instant) {
        if !self.config.enabled || !is_concrete_model(model) {
            return;
        }

        let wall_ms = current_timestamp_millis();
        let mut models = self.models.lock();
        let state = self.state_entry(&mut models, model, now, wall_ms);
        let was_capped = state.hard_capped;
        if state.record_reject(now, wall_ms) {
            info!(
                model,
                guess = state.guess,
                hard_capped = state.hard_capped,
                "Adaptive limit lowered"
            );
        }
        if state.hard_capped && !was_capped {
            warn!(model, "Model hard-capped after repeated rejections");
        }
    }

    /// Read-only view of every model with learned state, sorted by model id
    pub fn snapshot(&self) -> Vec<AdaptiveModelView> {
        let models = self.models.lock();
        let mut views: Vec<AdaptiveModelView> = models
            .iter()
            .map(|(model, state)| AdaptiveModelView::from_state(model, state))
            .collect();
        views.sort_by(|a, b| a.model.cmp(&b.model));
        views
    }

    /// Periodically persist the learned state
    pub fn start_snapshot_task(self: Arc<Self>, path: PathBuf) -> JoinHandle<()> {
        let period = self.config.snapshot_interval();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = self.save_snapshot(&path).await {
                    warn!("Failed to save adaptive snapshot to {:?}: {}", path, e);
                }
            }
        })
    }

    fn initial_guess(&self, model: &str) -> u32 {
        self.config.initial_guess(model)
    }

    fn state_entry<'a>(
        &self,
        models: &'a mut HashMap<String, AdaptiveModelState>,
        model: &str,
        now: Instant,
        wall_ms: i64,
    ) -> &'a mut AdaptiveModelState {
        models
            .entry(model.to_string())
            .or_insert_with(|| AdaptiveModelState::new(self.initial_guess(model), now, wall_ms))
    }
}
