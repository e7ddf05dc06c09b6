//! HTTP response handling for errors

use super::types::GatewayError;
use actix_web::http::StatusCode;
use actix_web::http::header::RETRY_AFTER;
use actix_web::{HttpResponse, ResponseError};

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Admission(rejection) => rejection.reason.status(),
            GatewayError::Provider(provider_error) => {
                let status = provider_error.http_status();
                if status >= 500 {
                    // Upstream failures surface as a gateway failure
                    StatusCode::BAD_GATEWAY
                } else {
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
            }
            GatewayError::Validation(_) | GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        let (error_type, code, message, retry_after_ms) = match self {
            GatewayError::Admission(rejection) => (
                "admission_error",
                rejection.reason.as_str().to_string(),
                self.to_string(),
                Some(rejection.retry_after_ms),
            ),
            GatewayError::Provider(provider_error) => (
                "upstream_error",
                if provider_error.http_status() == 429 {
                    "upstream_rate_limited".to_string()
                } else {
                    format!("upstream_{}", provider_error.http_status())
                },
                provider_error.to_string(),
                provider_error
                    .retry_after_secs()
                    .map(|secs| secs.saturating_mul(1000)),
            ),
            GatewayError::Validation(_) | GatewayError::BadRequest(_) => (
                "invalid_request_error",
                "invalid_request".to_string(),
                self.to_string(),
                None,
            ),
            GatewayError::HttpClient(_) => (
                "upstream_error",
                "upstream_unreachable".to_string(),
                self.to_string(),
                None,
            ),
            _ => (
                "server_error",
                "internal_error".to_string(),
                "An internal error occurred".to_string(),
                None,
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                message,
                error_type: error_type.to_string(),
                code,
                retry_after_ms,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        let mut builder = HttpResponse::build(status_code);
        if let Some(ms) = retry_after_ms {
            builder.insert_header((RETRY_AFTER, ms.div_ceil(1000).max(1).to_string()));
        }
        builder.json(error_response)
    }
}

/// Standard error response format (OpenAI-compatible envelope)
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
    pub timestamp: i64,
}
