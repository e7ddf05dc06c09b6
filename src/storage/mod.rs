//! Storage layer for the Gateway
//!
//! Shared state lives in an external store so several gateway instances can
//! enforce one budget. Everything else is in-process.

pub mod bucket;
/// Redis-backed bucket store
#[cfg(feature = "redis")]
pub mod redis;

pub use bucket::{BucketOutcome, BucketParams, SharedBucketStore};

use crate::config::RedisConfig;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the shared bucket store, if one is configured
///
/// Connection failures are not fatal: the rate limiter falls back to
/// in-process windows until the store answers again.
pub async fn connect_bucket_store(config: &RedisConfig) -> Option<Arc<dyn SharedBucketStore>> {
    if !config.enabled {
        info!("Shared store disabled, rate limiting uses in-process windows");
        return None;
    }

    #[cfg(feature = "redis")]
    {
        match redis::RedisPool::new(config) {
            Ok(pool) => {
                if let Err(e) = pool.health_check().await {
                    warn!("Redis not reachable at startup, running degraded: {}", e);
                }
                Some(Arc::new(pool))
            }
            Err(e) => {
                warn!("Invalid Redis configuration, running without shared store: {}", e);
                None
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    {
        warn!("Redis configured but the `redis` feature is disabled; using in-process windows");
        None
    }
}
