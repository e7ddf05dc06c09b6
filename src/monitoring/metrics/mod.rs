//! Metrics collection and aggregation
//!
//! Counters, gauges and histograms are exported in Prometheus text format; a
//! mirrored summary backs the JSON `/stats` view.

mod collector;
mod histogram;
mod types;


pub use collector::GatewayMetrics;
pub use histogram::{DurationHistogram, REQUEST_BUCKETS, UPSTREAM_BUCKETS};
pub use types::{LatencySummary, MetricsSummary};
