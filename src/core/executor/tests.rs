//! Tests for the upstream executor

use super::*;
use crate::config::{AdaptiveConfig, ConcurrencyConfig, MonitoringConfig};
use crate::core::adaptive::AdaptiveLimitEstimator;
use crate::core::concurrency::ConcurrencyGate;
use crate::core::providers::{ChunkStream, ProviderError};
use crate::monitoring::metrics::GatewayMetrics;
use crate::utils::error::{GatewayError, RejectionReason};
use bytes::Bytes;
use futures::StreamExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

struct Harness {
    executor: UpstreamExecutor,
    gate: Arc<ConcurrencyGate>,
    estimator: Arc<AdaptiveLimitEstimator>,
    metrics: Arc<GatewayMetrics>,
}

fn harness(max_concurrent: usize, max_queue_length: usize) -> Harness {
    let metrics = Arc::new(GatewayMetrics::new(&MonitoringConfig::default()).unwrap());
    let gate = Arc::new(
        ConcurrencyGate::new(ConcurrencyConfig {
            enabled: true,
            max_concurrent,
            max_queue_length,
            queue_timeout_ms: 1_000,
        })
        .with_metrics(Arc::clone(&metrics)),
    );
    let mut adaptive = AdaptiveConfig {
        snapshot_path: None,
        ..AdaptiveConfig::default()
    };
    adaptive.initial_guesses.insert("gpt-4o".to_string(), 10);
    let estimator = Arc::new(AdaptiveLimitEstimator::new(adaptive));

    Harness {
        executor: UpstreamExecutor::new(
            Arc::clone(&gate),
            Arc::clone(&estimator),
            Arc::clone(&metrics),
        ),
        gate,
        estimator,
        metrics,
    }
}

fn rate_limited() -> ProviderError {
    ProviderError::rate_limit("upstream", "slow down", Some(2))
}

#[tokio::test]
async fn test_success_records_usage_and_releases_slot() {
    let h = harness(1, 0);

    let response = h
        .executor
        .execute("gpt-4o", || async {
            Ok::<_, ProviderError>(json!({
                "choices": [{"message": {"content": "hi"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3}
            }))
        })
        .await
        .unwrap();

    assert_eq!(response["usage"]["prompt_tokens"], 12);
    assert_eq!(h.gate.active(), 0);

    let summary = h.metrics.summary();
    let tokens = summary.tokens_by_model.get("gpt-4o").unwrap();
    assert_eq!(tokens.prompt_tokens, 12);
    assert_eq!(tokens.completion_tokens, 3);
    assert_eq!(h.estimator.snapshot()[0].success_count, 1);
}

#[tokio::test]
async fn test_missing_usage_falls_back_to_estimate() {
    let h = harness(1, 0);

    h.executor
        .execute_with_estimate("gpt-4o", 7, || async {
            Ok::<_, ProviderError>(json!({"choices": [{"message": {"content": "12345678"}}]}))
        })
        .await
        .unwrap();

    let summary = h.metrics.summary();
    let tokens = summary.tokens_by_model.get("gpt-4o").unwrap();
    assert_eq!(tokens.prompt_tokens, 7);
    assert_eq!(tokens.completion_tokens, 2);
}

#[tokio::test]
async fn test_upstream_429_teaches_estimator_and_is_returned_unchanged() {
    let h = harness(1, 0);

    let err = h
        .executor
        .execute("gpt-4o", || async { Err::<Value, _>(rate_limited()) })
        .await
        .unwrap_err();

    match err {
        GatewayError::Provider(provider) => {
            assert!(provider.is_rate_limited());
            assert_eq!(provider.retry_after_secs(), Some(2));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert_eq!(h.gate.active(), 0);
    let view = &h.estimator.snapshot()[0];
    assert_eq!(view.reject_count, 1);
    assert_eq!(view.guess, 6);
    assert_eq!(h.metrics.summary().upstream_429_by_model.get("gpt-4o"), Some(&1));
}

#[tokio::test]
async fn test_upstream_500_does_not_teach_estimator() {
    let h = harness(1, 0);

    let err = h
        .executor
        .execute("gpt-4o", || async {
            Err::<Value, _>(ProviderError::api_error("upstream", 500, "boom"))
        })
        .await
        .unwrap_err();

    assert_eq!(err.upstream_status(), Some(500));
    assert!(h.estimator.snapshot().is_empty());
    assert_eq!(h.gate.active(), 0);
    assert_eq!(
        h.metrics.summary().errors_by_kind.get("upstream_error"),
        Some(&1)
    );
}

#[tokio::test]
async fn test_gate_rejection_never_invokes_operation() {
    let h = harness(1, 0);
    let _busy = h.gate.acquire().await.unwrap();
    let invoked = AtomicBool::new(false);

    let err = h
        .executor
        .execute("gpt-4o", || async {
            invoked.store(true, Ordering::SeqCst);
            Ok::<_, ProviderError>(json!({}))
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Admission(ref rejection) if rejection.reason == RejectionReason::QueueOverflow
    ));
    assert!(!invoked.load(Ordering::SeqCst));
    assert_eq!(
        h.metrics.summary().errors_by_kind.get("queue_overflow"),
        Some(&1)
    );
}

fn sse(chunks: Vec<std::result::Result<&'static str, ProviderError>>) -> ChunkStream {
    Box::pin(futures::stream::iter(
        chunks.into_iter().map(|chunk| chunk.map(Bytes::from)),
    ))
}

#[tokio::test]
async fn test_stream_holds_permit_until_finished() {
    let h = harness(1, 0);

    let mut stream = h
        .executor
        .execute_stream("gpt-4o", 5, || async {
            Ok(sse(vec![
                Ok("data: {\"choices\":[{\"delta\":{\"content\":\"abcd\"}}]}\n\n"),
                Ok("data: {\"choices\":[{\"delta\":{\"content\":\"efgh\"}}]}\n\n"),
                Ok("data: [DONE]\n\n"),
            ]))
        })
        .await
        .unwrap();

    let mut received = 0;
    while let Some(chunk) = stream.next().await {
        chunk.unwrap();
        received += 1;
        if received == 1 {
            assert_eq!(h.gate.active(), 1);
        }
    }
    drop(stream);

    assert_eq!(received, 3);
    assert_eq!(h.gate.active(), 0);
    let summary = h.metrics.summary();
    let tokens = summary.tokens_by_model.get("gpt-4o").unwrap();
    assert_eq!(tokens.completion_tokens, 2);
    assert_eq!(tokens.prompt_tokens, 5);
    assert_eq!(h.estimator.snapshot()[0].success_count, 1);
}

#[tokio::test]
async fn test_stream_error_with_429_feeds_reject() {
    let h = harness(1, 0);

    let stream = h
        .executor
        .execute_stream("gpt-4o", 0, || async {
            Ok(sse(vec![
                Ok("data: {\"choices\":[{\"delta\":{\"content\":\"ab\"}}]}\n\n"),
                Err(rate_limited()),
                Ok("data: [DONE]\n\n"),
            ]))
        })
        .await
        .unwrap();

    let items: Vec<_> = stream.collect().await;
    assert_eq!(items.len(), 2);
    assert!(items[1].is_err());

    let view = &h.estimator.snapshot()[0];
    assert_eq!(view.reject_count, 1);
    assert_eq!(view.success_count, 0);
    assert_eq!(h.gate.active(), 0);
}

#[tokio::test]
async fn test_dropped_stream_returns_slot() {
    let h = harness(1, 0);

    let stream = h
        .executor
        .execute_stream("gpt-4o", 0, || async {
            Ok(sse(vec![Ok("data: {}\n\n"), Ok("data: [DONE]\n\n")]))
        })
        .await
        .unwrap();
    assert_eq!(h.gate.active(), 1);

    drop(stream);
    assert_eq!(h.gate.active(), 0);
    assert!(h.estimator.snapshot().is_empty());
}

#[tokio::test]
async fn test_stream_open_failure_releases_slot() {
    let h = harness(1, 0);

    let result = h
        .executor
        .execute_stream("gpt-4o", 0, || async { Err(rate_limited()) })
        .await;

    assert!(result.is_err());
    assert_eq!(h.gate.active(), 0);
    assert_eq!(h.estimator.snapshot()[0].reject_count, 1);
}
