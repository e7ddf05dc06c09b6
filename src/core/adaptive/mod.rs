//! Adaptive per-model limit estimation
//!
//! Learns a requests-per-minute ceiling for each upstream model from the 429
//! responses it produces. Decrease is multiplicative and fast, increase is
//! slow and only happens while the current ceiling is nearly saturated.

mod estimator;
mod snapshot;
mod types;

#[cfg(test)]
mod tests;

pub use estimator::AdaptiveLimitEstimator;
pub use snapshot::{SnapshotEntry, SnapshotFile};
pub use types::{AdaptiveModelView, MAX_GUESS, MIN_GUESS};

/// Model names that do not identify a real upstream model
const GENERIC_MODELS: &[&str] = &["", "default", "auto", "*", "unknown"];

/// Whether `model` names a real upstream model that learning should apply to
pub fn is_concrete_model(model: &str) -> bool {
    let normalized = model.trim().to_ascii_lowercase();
    !GENERIC_MODELS.contains(&normalized.as_str())
}
