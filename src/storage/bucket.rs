//! Shared token bucket store abstraction

use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// Parameters for one refill-and-consume call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketParams {
    /// Maximum tokens the bucket may hold
    pub capacity: u32,
    /// Tokens restored per second
    pub refill_per_sec: f64,
    /// Idle expiry of the bucket, in seconds
    pub ttl_secs: u64,
}

/// Result of a refill-and-consume call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketOutcome {
    /// Whether a token was consumed
    pub allowed: bool,
    /// Whole tokens left after the call
    pub remaining: u32,
    /// Milliseconds until one token is available (0 when allowed)
    pub retry_after_ms: u64,
}

/// Store holding token buckets shared by every gateway instance
///
/// Implementations must refill and consume atomically.
#[async_trait]
pub trait SharedBucketStore: Send + Sync + Debug {
    /// Refill the bucket at `key`, then try to consume one token
    async fn take(&self, key: &str, params: BucketParams) -> Result<BucketOutcome>;

    /// Liveness probe
    async fn ping(&self) -> Result<()>;
}
