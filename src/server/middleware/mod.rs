//! HTTP middleware implementations
//!
//! - Request ID tracking (`x-request-id`, echoed on the response)
//! - Request metrics (every route except `/metrics`)

mod metrics;
mod request_id;


// Re-export all middleware
pub use metrics::{MetricsMiddleware, MetricsMiddlewareService, TimedBody};
pub use request_id::{REQUEST_ID_HEADER, RequestIdMiddleware, RequestIdMiddlewareService};
