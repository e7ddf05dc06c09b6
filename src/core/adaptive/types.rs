//! Adaptive estimator types and tuning constants

use serde::Serialize;
use std::time::{Duration, Instant};

/// Lower bound of any guess
pub const MIN_GUESS: u32 = 1;
/// Upper bound of any guess
pub const MAX_GUESS: u32 = 200;

/// Length of the rolling success/reject window
pub(super) const WINDOW: Duration = Duration::from_secs(60);
/// Minimum time between two increases
pub(super) const INCREASE_COOLDOWN: Duration = Duration::from_secs(5 * 60);
/// Minimum time between two decreases
pub(super) const DECREASE_COOLDOWN: Duration = Duration::from_secs(30);
/// Successes per guess above which the ceiling is considered saturated
pub(super) const SATURATION_RATIO: f64 = 0.8;

/// Learned state for one model
#[derive(Debug, Clone)]
pub(super) struct AdaptiveModelState {
    pub(super) guess: u32,
    pub(super) success_count: u32,
    pub(super) reject_count: u32,
    pub(super) window_start: Instant,
    pub(super) last_increase_at: Option<Instant>,
    pub(super) last_decrease_at: Option<Instant>,
    pub(super) hard_capped: bool,
    /// Wall clock, milliseconds since the Unix epoch
    pub(super) last_reject_at: Option<i64>,
    /// Wall clock, milliseconds since the Unix epoch
    pub(super) updated_at: i64,
}

impl AdaptiveModelState {
    pub(super) fn new(guess: u32, now: Instant, wall_ms: i64) -> Self {
        Self {
            guess: guess.clamp(MIN_GUESS, MAX_GUESS),
            success_count: 0,
            reject_count: 0,
            window_start: now,
            last_increase_at: None,
            last_decrease_at: None,
            hard_capped: false,
            last_reject_at: None,
            updated_at: wall_ms,
        }
    }

    /// Reset counters once the window is a minute old
    pub(super) fn roll_window(&mut self, now: Instant) {
        if now.saturating_duration_since(self.window_start) >= WINDOW {
            self.success_count = 0;
            self.reject_count = 0;
            self.window_start = now;
        }
    }

    /// Returns true when the guess was raised
    pub(super) fn record_success(&mut self, now: Instant, wall_ms: i64) -> bool {
        self.roll_window(now);
        self.success_count = self.success_count.saturating_add(1);
        self.updated_at = wall_ms;

        let saturated =
            f64::from(self.success_count) / f64::from(self.guess) >= SATURATION_RATIO;
        let cooled_down = self
            .last_increase_at
            .is_none_or(|at| now.saturating_duration_since(at) >= INCREASE_COOLDOWN);

        if self.reject_count == 0
            && saturated
            && cooled_down
            && !self.hard_capped
            && self.guess < MAX_GUESS
        {
            // ceil(guess * 1.2) without float rounding error
            self.guess = (self.guess * 6).div_ceil(5).min(MAX_GUESS);
            self.last_increase_at = Some(now);
            return true;
        }
        false
    }

    /// Returns true when the guess was lowered
    pub(super) fn record_reject(&mut self, now: Instant, wall_ms: i64) -> bool {
        self.roll_window(now);
        self.reject_count = self.reject_count.saturating_add(1);
        self.last_reject_at = Some(wall_ms);
        self.updated_at = wall_ms;

        if self.reject_count >= 2 && self.success_count <= 2 {
            self.hard_capped = true;
        }

        let cooled_down = self
            .last_decrease_at
            .is_none_or(|at| now.saturating_duration_since(at) >= DECREASE_COOLDOWN);
        if !cooled_down {
            return false;
        }

        let lowered = if self.hard_capped {
            self.guess / 2
        } else {
            self.guess * 3 / 5
        };
        self.guess = lowered.max(MIN_GUESS);
        self.last_decrease_at = Some(now);
        true
    }
}

/// Read-only view of one model's learned state
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveModelView {
    pub model: String,
    pub guess: u32,
    pub hard_capped: bool,
    pub success_count: u32,
    pub reject_count: u32,
    pub last_reject_at: Option<i64>,
    pub updated_at: i64,
}

impl AdaptiveModelView {
    pub(super) fn from_state(model: &str, state: &AdaptiveModelState) -> Self {
        Self {
            model: model.to_string(),
            guess: state.guess,
            hard_capped: state.hard_capped,
            success_count: state.success_count,
            reject_count: state.reject_count,
            last_reject_at: state.last_reject_at,
            updated_at: state.updated_at,
        }
    }
}
