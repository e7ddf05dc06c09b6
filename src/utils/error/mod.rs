//! Error handling utilities
//!
//! Crate-wide error type, the structured admission rejection and their HTTP mapping.

pub mod error;

// Re-export commonly used types
pub use error::*;
