//! Chat completions endpoint

use crate::core::usage::estimate_prompt_tokens;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::http::header::{AUTHORIZATION, CACHE_CONTROL, HeaderMap};
use actix_web::{HttpRequest, HttpResponse, web};
use futures::StreamExt;
use serde_json::Value;
use tracing::{debug, info};

/// Identity used when the caller presents no key
pub const ANONYMOUS_IDENTITY: &str = "anon";

/// Configure chat completion routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/chat/completions", web::post().to(chat_completions));
}

/// Caller identity: the bearer token, else `x-api-key`, else anonymous
pub fn extract_identity(headers: &HeaderMap) -> String {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    let api_key = || {
        headers
            .get("x-api-key")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
    };

    bearer
        .filter(|key| !key.is_empty())
        .or_else(|| api_key().filter(|key| !key.is_empty()))
        .unwrap_or(ANONYMOUS_IDENTITY)
        .to_string()
}

/// Model named by the request body
fn requested_model(body: &Value) -> Result<String> {
    let model = body
        .get("model")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .ok_or_else(|| GatewayError::bad_request("`model` must be a non-empty string"))?;

    if !body.get("messages").is_some_and(Value::is_array) {
        return Err(GatewayError::bad_request("`messages` must be an array"));
    }

    Ok(model.to_string())
}

/// Chat completions endpoint
///
/// Admission runs first: the per-key rate limiter, then the concurrency gate
/// inside the executor. The body is passed to the upstream unchanged.
pub async fn chat_completions(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let model = match requested_model(&body) {
        Ok(model) => model,
        Err(e) => {
            state.metrics.record_error(e.kind());
            return Err(e);
        }
    };
    let identity = extract_identity(req.headers());

    let decision = state.rate_limiter.admit(&identity, &model).await;
    if let Some(rejection) = decision.rejection() {
        state.metrics.record_error(rejection.reason.as_str());
        return Err(rejection.into());
    }

    let prompt_estimate = estimate_prompt_tokens(&body);
    let stream = body.get("stream").and_then(Value::as_bool).unwrap_or(false);
    let provider = state.provider.clone();

    info!(model = %model, stream = stream, "Chat completion request");

    let mut response = HttpResponse::Ok();
    response
        .insert_header(("x-ratelimit-limit", decision.limit.to_string()))
        .insert_header(("x-ratelimit-remaining", decision.remaining().to_string()));

    if stream {
        let chunks = state
            .executor
            .execute_stream(&model, prompt_estimate, || async move {
                provider.chat_completion_stream(body).await
            })
            .await?;

        debug!(model = %model, "Streaming upstream response");
        Ok(response
            .content_type("text/event-stream")
            .insert_header((CACHE_CONTROL, "no-cache"))
            .streaming(chunks.map(|chunk| chunk.map_err(GatewayError::from))))
    } else {
        let completion = state
            .executor
            .execute_with_estimate(&model, prompt_estimate, || async move {
                provider.chat_completion(body).await
            })
            .await?;

        Ok(response.json(completion))
    }
}
