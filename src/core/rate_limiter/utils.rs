//! Utility functions for rate limiter

use super::limiter::RateLimiter;
use super::types::CLEANUP_INTERVAL;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::debug;

/// Rate key of a caller and model pair
pub fn rate_key(identity: &str, model: &str) -> String {
    format!("{}:{}", identity, model)
}

impl RateLimiter {
    /// Drop local windows that have expired
    pub fn cleanup(&self) {
        self.cleanup_at(Instant::now());
    }

    pub(crate) fn cleanup_at(&self, now: Instant) {
        let before = self.windows.len();
        self.windows.retain(|_, window| !window.is_expired(now));
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed = removed, "Dropped expired rate limit windows");
        }
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                self.cleanup();
            }
        })
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Whether admissions go through the shared store first
    pub fn has_shared_store(&self) -> bool {
        self.store.is_some()
    }

    /// Local windows currently tracked
    pub fn tracked_windows(&self) -> usize {
        self.windows.len()
    }
}
