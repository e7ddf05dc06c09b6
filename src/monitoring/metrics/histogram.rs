//! Fixed-bucket duration histogram with quantile estimation

use std::time::Duration;

/// Buckets for HTTP request and queue wait durations, in seconds
pub const REQUEST_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

/// Buckets for upstream call durations, in seconds
pub const UPSTREAM_BUCKETS: &[f64] = &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0];

/// Cumulative bucket counts: `bucket_counts[i]` holds observations `<= bounds[i]`
#[derive(Clone, Debug)]
pub struct DurationHistogram {
    bounds: &'static [f64],
    bucket_counts: Vec<u64>,
    sum_seconds: f64,
    max_seconds: f64,
    count: u64,
}

impl DurationHistogram {
    pub fn new(bounds: &'static [f64]) -> Self {
        Self {
            bounds,
            bucket_counts: vec![0; bounds.len()],
            sum_seconds: 0.0,
            max_seconds: 0.0,
            count: 0,
        }
    }

    pub fn observe(&mut self, duration: Duration) {
        self.observe_secs(duration.as_secs_f64());
    }

    pub fn observe_secs(&mut self, seconds: f64) {
        let seconds = seconds.max(0.0);
        self.sum_seconds += seconds;
        self.max_seconds = self.max_seconds.max(seconds);
        self.count = self.count.saturating_add(1);
        for (idx, bound) in self.bounds.iter().enumerate() {
            if seconds <= *bound {
                self.bucket_counts[idx] = self.bucket_counts[idx].saturating_add(1);
            }
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_seconds / self.count as f64)
    }

    /// Upper bound of the first bucket whose cumulative count reaches the target rank
    ///
    /// Observations beyond the last bucket report the largest value seen.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.count == 0 {
            return None;
        }

        let q = q.clamp(0.0, 1.0);
        let rank = ((q * self.count as f64).ceil() as u64).max(1);

        self.bounds
            .iter()
            .zip(&self.bucket_counts)
            .find(|(_, cumulative)| **cumulative >= rank)
            .map(|(bound, _)| *bound)
            .or(Some(self.max_seconds))
    }
}
