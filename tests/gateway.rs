//! End-to-end tests: the assembled gateway in front of a mock upstream

use actix_web::http::StatusCode;
use actix_web::{test, web};
use completion_gateway::config::{Config, GatewayConfig};
use completion_gateway::server::{AppState, HttpServer};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_config(upstream: &MockServer) -> Config {
    let mut gateway = GatewayConfig::default();
    gateway.upstream.api_base = format!("{}/v1", upstream.uri());
    gateway.upstream.api_key = Some("sk-upstream".to_string());
    gateway.storage.redis.enabled = false;
    gateway.rate_limit.base_limit_per_minute = 60;
    gateway.rate_limit.leeway = 0;
    gateway.adaptive.snapshot_path = None;
    gateway.adaptive.initial_guesses.insert("gpt-4o".to_string(), 10);
    Config { gateway }
}

fn chat_request(model: &str, stream: bool) -> Value {
    json!({
        "model": model,
        "stream": stream,
        "messages": [{"role": "user", "content": "Say hello"}]
    })
}

fn completion_body() -> Value {
    json!({
        "id": "chatcmpl-42",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Hello!"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    })
}

#[actix_web::test]
async fn test_completion_is_forwarded_with_upstream_credentials() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-upstream"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body()))
        .expect(1)
        .mount(&upstream)
        .await;

    let state = web::Data::new(AppState::new(gateway_config(&upstream)).await.unwrap());
    let app = test::init_service(HttpServer::create_app(state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/v1/chat/completions")
        .insert_header(("authorization", "Bearer client-key"))
        .set_json(chat_request("gpt-4o", false))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("x-ratelimit-remaining").unwrap(), "59");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["id"], "chatcmpl-42");

    let summary = state.metrics.summary();
    assert_eq!(summary.tokens_by_model["gpt-4o"].prompt_tokens, 12);
    assert_eq!(summary.tokens_by_model["gpt-4o"].completion_tokens, 3);
    assert_eq!(summary.upstream_active, 0);
}

#[actix_web::test]
async fn test_upstream_429_is_relayed_and_learned() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(json!({"error": {"message": "Rate limit reached"}})),
        )
        .mount(&upstream)
        .await;

    let state = web::Data::new(AppState::new(gateway_config(&upstream)).await.unwrap());
    let app = test::init_service(HttpServer::create_app(state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/v1/chat/completions")
        .set_json(chat_request("gpt-4o", false))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers().get("retry-after").unwrap(), "7");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"]["code"], "upstream_rate_limited");

    // 10 * 3 / 5
    assert_eq!(state.estimator.guess("gpt-4o"), Some(6));
    assert_eq!(state.metrics.summary().upstream_429_by_model["gpt-4o"], 1);
}

#[actix_web::test]
async fn test_upstream_server_error_becomes_bad_gateway() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&upstream)
        .await;

    let state = web::Data::new(AppState::new(gateway_config(&upstream)).await.unwrap());
    let app = test::init_service(HttpServer::create_app(state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/v1/chat/completions")
        .set_json(chat_request("gpt-4o", false))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    // Server errors do not teach the estimator
    assert_eq!(state.estimator.guess("gpt-4o"), Some(10));
}

#[actix_web::test]
async fn test_streaming_response_is_relayed() {
    let upstream = MockServer::start().await;
    let sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hello \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"world\"}}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse),
        )
        .mount(&upstream)
        .await;

    let state = web::Data::new(AppState::new(gateway_config(&upstream)).await.unwrap());
    let app = test::init_service(HttpServer::create_app(state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/v1/chat/completions")
        .set_json(chat_request("gpt-4o", true))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    let body = test::read_body(res).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("world"));
    assert!(text.ends_with("data: [DONE]\n\n"));

    // "Hello world" = 11 chars -> 3 tokens
    let summary = state.metrics.summary();
    assert_eq!(summary.tokens_by_model["gpt-4o"].completion_tokens, 3);
    assert_eq!(summary.upstream_active, 0);
}

#[actix_web::test]
async fn test_gate_overflow_rejects_with_service_unavailable() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&upstream)
        .await;

    let mut config = gateway_config(&upstream);
    config.gateway.concurrency.max_concurrent = 1;
    config.gateway.concurrency.max_queue_length = 0;

    let state = web::Data::new(AppState::new(config).await.unwrap());
    let app = test::init_service(HttpServer::create_app(state.clone())).await;

    let first = test::TestRequest::post()
        .uri("/v1/chat/completions")
        .insert_header(("x-api-key", "a"))
        .set_json(chat_request("gpt-4o", false))
        .to_request();
    let second = test::TestRequest::post()
        .uri("/v1/chat/completions")
        .insert_header(("x-api-key", "b"))
        .set_json(chat_request("gpt-4o", false))
        .to_request();

    let (a, b) = futures::join!(
        test::call_service(&app, first),
        test::call_service(&app, second)
    );
    let mut statuses = vec![a.status(), b.status()];
    statuses.sort();

    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::SERVICE_UNAVAILABLE]);
    let rejected = if a.status() == StatusCode::SERVICE_UNAVAILABLE { a } else { b };
    assert_eq!(rejected.headers().get("retry-after").unwrap(), "1");
    let body: Value = test::read_body_json(rejected).await;
    assert_eq!(body["error"]["code"], "queue_overflow");
}

#[actix_web::test]
async fn test_learned_limits_survive_a_restart() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&upstream)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("adaptive.json");
    let mut config = gateway_config(&upstream);
    config.gateway.adaptive.snapshot_path = Some(snapshot.to_string_lossy().into_owned());

    let state = web::Data::new(AppState::new(config.clone()).await.unwrap());
    let app = test::init_service(HttpServer::create_app(state.clone())).await;
    let req = test::TestRequest::post()
        .uri("/v1/chat/completions")
        .set_json(chat_request("gpt-4o", false))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    state.save_snapshot().await;

    let restarted = AppState::new(config).await.unwrap();
    assert_eq!(restarted.estimator.guess("gpt-4o"), Some(6));
}

#[actix_web::test]
async fn test_health_and_metrics_endpoints() {
    let upstream = MockServer::start().await;
    let state = web::Data::new(AppState::new(gateway_config(&upstream)).await.unwrap());
    let app = test::init_service(HttpServer::create_app(state)).await;

    let res = test::call_service(&app, test::TestRequest::get().uri("/ready").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res =
        test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = test::read_body(res).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
}
