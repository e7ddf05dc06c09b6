//! Upstream executor
//!
//! Runs upstream operations inside a concurrency slot and reports every
//! outcome to the adaptive estimator and the metrics.

mod execute;
mod streaming;

#[cfg(test)]
mod tests;

pub use execute::UpstreamExecutor;
