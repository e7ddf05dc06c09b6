//! Monitoring configuration validators

use super::trait_def::Validate;
use crate::config::models::*;

impl Validate for MonitoringConfig {
    fn validate(&self) -> Result<(), String> {
        if !(self.ready_queue_ratio > 0.0 && self.ready_queue_ratio <= 1.0) {
            return Err("Monitoring ready_queue_ratio must be within (0, 1]".to_string());
        }

        if self.log_level.trim().is_empty() {
            return Err("Monitoring log_level cannot be empty".to_string());
        }

        Ok(())
    }
}
