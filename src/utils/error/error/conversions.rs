//! Type conversions for GatewayError

use super::types::GatewayError;

impl From<prometheus::Error> for GatewayError {
    fn from(err: prometheus::Error) -> Self {
        GatewayError::Monitoring(err.to_string())
    }
}

impl From<tokio::task::JoinError> for GatewayError {
    fn from(err: tokio::task::JoinError) -> Self {
        GatewayError::Internal(format!("Background task failed: {}", err))
    }
}
