//! Rate Limiting Implementation
//!
//! Per identity and model admission. A token bucket in the shared store is
//! authoritative when one is reachable; otherwise each instance enforces an
//! in-process fixed window.

mod limiter;
mod strategies;
mod types;
mod utils;


// Re-export public types
pub use limiter::RateLimiter;
pub use types::AdmitDecision;
pub use utils::rate_key;
