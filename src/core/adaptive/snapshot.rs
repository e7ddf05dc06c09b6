//! Best-effort persistence of learned limits
//!
//! The snapshot is a warm-up cache: a missing, corrupt or stale file only
//! means the estimator starts from its heuristic table.

use super::estimator::AdaptiveLimitEstimator;
use super::types::AdaptiveModelState;
use crate::utils::current_timestamp_millis;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// On-disk snapshot document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFile {
    /// Milliseconds since the Unix epoch
    pub saved_at: i64,
    pub models: BTreeMap<String, SnapshotEntry>,
}

/// Persisted state of one model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub guess: u32,
    pub hard_capped: bool,
    pub last_reject_at: Option<i64>,
    pub updated_at: i64,
}

impl AdaptiveLimitEstimator {
    /// Build the snapshot document from the current state
    pub fn to_snapshot(&self) -> SnapshotFile {
        let models = self.models.lock();
        SnapshotFile {
            saved_at: current_timestamp_millis(),
            models: models
                .iter()
                .map(|(model, state)| {
                    (
                        model.clone(),
                        SnapshotEntry {
                            guess: state.guess,
                            hard_capped: state.hard_capped,
                            last_reject_at: state.last_reject_at,
                            updated_at: state.updated_at,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Write the snapshot through a temporary file and an atomic rename
    pub async fn save_snapshot(&self, path: &Path) -> Result<()> {
        let snapshot = self.to_snapshot();
        let body = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = temp_path(path);
        tokio::fs::write(&tmp, &body).await?;
        tokio::fs::rename(&tmp, path).await?;

        debug!(
            models = snapshot.models.len(),
            "Adaptive snapshot written to {:?}", path
        );
        Ok(())
    }

    /// Seed state from a snapshot file; returns the number of models loaded
    pub async fn load_snapshot(&self, path: &Path) -> usize {
        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No adaptive snapshot at {:?}, starting fresh", path);
                return 0;
            }
            Err(e) => {
                warn!("Failed to read adaptive snapshot {:?}: {}", path, e);
                return 0;
            }
        };

        let snapshot: SnapshotFile = match serde_json::from_slice(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring corrupt adaptive snapshot {:?}: {}", path, e);
                return 0;
            }
        };

        self.seed_from(snapshot, current_timestamp_millis())
    }

    /// Apply entries younger than the configured maximum age
    pub(super) fn seed_from(&self, snapshot: SnapshotFile, now_ms: i64) -> usize {
        let max_age_ms = i64::try_from(self.config.snapshot_max_age().as_millis()).unwrap_or(i64::MAX);
        let now = Instant::now();

        let mut models = self.models.lock();
        let mut loaded = 0;
        let mut stale = 0;
        for (model, entry) in snapshot.models {
            if now_ms.saturating_sub(entry.updated_at) >= max_age_ms {
                stale += 1;
                continue;
            }

            let mut state = AdaptiveModelState::new(entry.guess, now, entry.updated_at);
            state.hard_capped = entry.hard_capped;
            state.last_reject_at = entry.last_reject_at;
            models.insert(model, state);
            loaded += 1;
        }

        info!(loaded, stale, "Adaptive snapshot loaded");
        loaded
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "adaptive_limits.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
