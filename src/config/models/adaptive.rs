//! Adaptive limit estimation configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Adaptive limit estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// Enable adaptive estimation
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Initial guess for models missing from the heuristic table
    #[serde(default = "default_initial_guess")]
    pub default_initial_guess: u32,
    /// Heuristic table: model id to initial requests-per-minute guess
    #[serde(default)]
    pub initial_guesses: HashMap<String, u32>,
    /// Snapshot file path (None disables persistence)
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: Option<String>,
    /// Snapshot save interval in seconds
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_secs: u64,
    /// Maximum age of snapshot entries accepted on load, in seconds
    #[serde(default = "default_snapshot_max_age")]
    pub snapshot_max_age_secs: u64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_initial_guess: default_initial_guess(),
            initial_guesses: HashMap::new(),
            snapshot_path: default_snapshot_path(),
            snapshot_interval_secs: default_snapshot_interval(),
            snapshot_max_age_secs: default_snapshot_max_age(),
        }
    }
}

impl AdaptiveConfig {
    /// Initial guess for a model, from the heuristic table or the default
    pub fn initial_guess(&self, model: &str) -> u32 {
        self.initial_guesses
            .get(model)
            .copied()
            .unwrap_or(self.default_initial_guess)
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_secs)
    }

    pub fn snapshot_max_age(&self) -> Duration {
        Duration::from_secs(self.snapshot_max_age_secs)
    }
}
