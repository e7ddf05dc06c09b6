//! Error handling for the Gateway
//!
//! This module defines all error types used throughout the gateway.

mod admission;
mod conversions;
mod helpers;
mod response;
#[cfg(test)]
mod tests;
mod types;

pub use admission::{AdmissionRejection, RejectionReason};
pub use response::{ErrorDetail, ErrorResponse};
pub use types::{GatewayError, Result};
