//! Monitoring and observability
//!
//! Prometheus metrics, the JSON summary behind `/stats` and the readiness probe.

pub mod metrics;
pub mod readiness;

pub use metrics::{GatewayMetrics, MetricsSummary};
pub use readiness::{ReadinessProbe, ReadinessReport};
