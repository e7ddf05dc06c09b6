//! Core functionality for the Gateway
//!
//! Admission control and upstream execution: the rate limiter, the adaptive
//! per-model limit estimator, the concurrency gate and the executor that ties
//! them to the upstream provider.

pub mod adaptive;
pub mod concurrency;
pub mod executor;
pub mod providers;
pub mod rate_limiter;
pub mod usage;

pub use adaptive::AdaptiveLimitEstimator;
pub use concurrency::{ConcurrencyGate, GatePermit};
pub use executor::UpstreamExecutor;
pub use providers::{ChunkStream, OpenAICompatibleProvider, ProviderError, UpstreamProvider};
pub use rate_limiter::{AdmitDecision, RateLimiter};
