//! Helper functions for creating specific error types

use super::types::GatewayError;

/// Helper functions for creating specific errors
impl GatewayError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store(message.into())
    }

    pub fn monitoring<S: Into<String>>(message: S) -> Self {
        Self::Monitoring(message.into())
    }
}

impl GatewayError {
    /// Short label used for the `errors_total{kind}` metric
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Admission(rejection) => rejection.reason.as_str(),
            Self::Provider(err) if err.is_rate_limited() => "upstream_rate_limited",
            Self::Provider(_) => "upstream_error",
            Self::Validation(_) | Self::BadRequest(_) => "invalid_request",
            #[cfg(feature = "redis")]
            Self::Redis(_) => "store_error",
            Self::Store(_) => "store_error",
            _ => "internal_error",
        }
    }

    /// Upstream status carried by this error, if it came from the provider
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Provider(err) => Some(err.http_status()),
            _ => None,
        }
    }
}
