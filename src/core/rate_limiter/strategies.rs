//! Admission strategies: shared token bucket and local fixed window

use super::limiter::RateLimiter;
use super::types::{AdmitDecision, BUCKET_TTL_SECS, LocalWindow};
use crate::storage::{BucketParams, SharedBucketStore};
use crate::utils::error::Result;
use std::time::Instant;

impl RateLimiter {
    /// Refill-and-consume against the shared token bucket
    pub(super) async fn admit_shared(
        &self,
        store: &dyn SharedBucketStore,
        key: &str,
        model: &str,
    ) -> Result<AdmitDecision> {
        let capacity = self
            .config
            .bucket_capacity(self.estimator.guess(model))
            .max(1);
        let params = BucketParams {
            capacity,
            refill_per_sec: self.config.refill_per_second(),
            ttl_secs: BUCKET_TTL_SECS,
        };

        let store_key = format!("{}:{}", self.config.key_prefix, key);
        let outcome = store.take(&store_key, params).await?;

        Ok(AdmitDecision {
            allowed: outcome.allowed,
            used: capacity.saturating_sub(outcome.remaining),
            limit: capacity,
            retry_after_ms: if outcome.allowed {
                0
            } else {
                outcome.retry_after_ms.max(1)
            },
        })
    }

    /// Fixed window admission in process memory
    pub(super) fn admit_local(&self, key: &str) -> AdmitDecision {
        self.admit_local_at(key, Instant::now())
    }

    pub(crate) fn admit_local_at(&self, key: &str, now: Instant) -> AdmitDecision {
        let limit = self.config.local_limit();

        // Avoid String allocation if key already exists
        let mut window = match self.windows.get_mut(key) {
            Some(window) => window,
            None => self
                .windows
                .entry(key.to_string())
                .or_insert_with(|| LocalWindow::new(now)),
        };

        if window.is_expired(now) {
            *window = LocalWindow::new(now);
        }

        if window.count < limit {
            window.count += 1;
            AdmitDecision {
                allowed: true,
                used: window.count,
                limit,
                retry_after_ms: 0,
            }
        } else {
            let retry_after_ms = (window.remaining(now).as_millis() as u64).max(1);
            AdmitDecision {
                allowed: false,
                used: window.count,
                limit,
                retry_after_ms,
            }
        }
    }
}
