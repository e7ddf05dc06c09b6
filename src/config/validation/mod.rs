//! Configuration validation
//!
//! This module provides validation logic for all configuration structures.
//!
//! The validation is organized into several submodules:
//! - `trait_def`: Core Validate trait definition
//! - `config_validators`: Gateway, server and upstream validators
//! - `limit_validators`: Rate limit, adaptive and concurrency validators
//! - `storage_validators`: Storage-related validators
//! - `monitoring_validators`: Monitoring-related validators
//! - `tests`: Test suite for all validators

mod config_validators;
mod limit_validators;
mod monitoring_validators;
mod storage_validators;
mod trait_def;

pub use trait_def::Validate;
