//! Tests for error mapping

use super::*;
use crate::core::providers::ProviderError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::http::header::RETRY_AFTER;
use actix_web::ResponseError;
use reqwest::header::HeaderMap;

async fn body_of(err: &GatewayError) -> ErrorResponse {
    let response = err.error_response();
    let bytes = to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_rejection_reason_statuses() {
    assert_eq!(
        RejectionReason::RateLimitExceeded.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        RejectionReason::QueueOverflow.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        RejectionReason::QueueTimeout.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[test]
fn test_retry_after_rounds_up() {
    assert_eq!(AdmissionRejection::rate_limited(1).retry_after_secs(), 1);
    assert_eq!(AdmissionRejection::rate_limited(1000).retry_after_secs(), 1);
    assert_eq!(AdmissionRejection::rate_limited(1001).retry_after_secs(), 2);
    assert_eq!(AdmissionRejection::queue_timeout(0).retry_after_secs(), 1);
}

#[actix_web::test]
async fn test_rate_limited_response() {
    let err = GatewayError::from(AdmissionRejection::rate_limited(2500));
    let response = err.error_response();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "3");

    let body = body_of(&err).await;
    assert_eq!(body.error.code, "rate_limit_exceeded");
    assert_eq!(body.error.retry_after_ms, Some(2500));
    assert_eq!(err.kind(), "rate_limit_exceeded");
}

#[actix_web::test]
async fn test_queue_overflow_response() {
    let err = GatewayError::from(AdmissionRejection::queue_overflow(1000));
    assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_of(&err).await;
    assert_eq!(body.error.code, "queue_overflow");
    assert_eq!(body.error.error_type, "admission_error");
}

#[actix_web::test]
async fn test_upstream_rate_limit_surfaces_as_429() {
    let err = GatewayError::from(ProviderError::rate_limit("upstream", "slow down", Some(4)));
    let response = err.error_response();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "4");
    assert_eq!(err.kind(), "upstream_rate_limited");
    assert_eq!(err.upstream_status(), Some(429));
}

#[actix_web::test]
async fn test_upstream_failure_surfaces_as_502() {
    let err = GatewayError::from(ProviderError::from_status(
        "upstream",
        500,
        &HeaderMap::new(),
        "internal",
    ));
    assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

    let body = body_of(&err).await;
    assert_eq!(body.error.code, "upstream_500");
    assert!(body.error.message.contains("internal"));
    assert!(body.error.retry_after_ms.is_none());

    let network = GatewayError::from(ProviderError::network("upstream", "refused"));
    assert_eq!(network.status_code(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_upstream_client_error_passes_through() {
    let err = GatewayError::from(ProviderError::api_error("upstream", 400, "bad model"));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.kind(), "upstream_error");
}

#[actix_web::test]
async fn test_internal_error_hides_details() {
    let err = GatewayError::internal("secret detail");
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_of(&err).await;
    assert!(!body.error.message.contains("secret"));
}

#[test]
fn test_bad_request_status() {
    assert_eq!(
        GatewayError::bad_request("missing model").status_code(),
        StatusCode::BAD_REQUEST
    );
}
