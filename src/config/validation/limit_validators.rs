//! Admission control validators

use super::trait_def::Validate;
use crate::config::models::*;
use crate::core::adaptive::MAX_GUESS;

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.base_limit_per_minute == 0 {
            return Err("Rate limit base_limit_per_minute must be greater than 0".to_string());
        }

        if self.key_prefix.is_empty() {
            return Err("Rate limit key_prefix cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Validate for AdaptiveConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_GUESS).contains(&self.default_initial_guess) {
            return Err(format!(
                "Adaptive default_initial_guess must be within 1..={}",
                MAX_GUESS
            ));
        }

        for (model, guess) in &self.initial_guesses {
            if !(1..=MAX_GUESS).contains(guess) {
                return Err(format!(
                    "Initial guess for model '{}' must be within 1..={}",
                    model, MAX_GUESS
                ));
            }
        }

        if self.snapshot_path.is_some() && self.snapshot_interval_secs == 0 {
            return Err("Adaptive snapshot_interval_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for ConcurrencyConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.max_concurrent == 0 {
            return Err("Concurrency max_concurrent must be greater than 0".to_string());
        }

        if self.queue_timeout_ms == 0 {
            return Err("Concurrency queue_timeout_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}
