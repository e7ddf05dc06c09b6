//! Utility modules for the completion gateway
//!
//! - **error**: crate-wide error types and their HTTP mapping
//! - **logging**: tracing subscriber setup

pub mod error;
pub mod logging;

use uuid::Uuid;

/// Generate a unique request ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get current timestamp in milliseconds
pub fn current_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Sanitize a connection URL for logging (hide password)
pub fn sanitize_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut sanitized = parsed.clone();
        if sanitized.password().is_some() {
            let _ = sanitized.set_password(Some("***"));
        }
        sanitized.to_string()
    } else {
        "invalid_url".to_string()
    }
}
