//! Metrics, stats and adaptive estimator endpoints

use crate::core::adaptive::AdaptiveModelView;
use crate::monitoring::MetricsSummary;
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde::Serialize;

/// Configure observability routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics))
        .route("/stats", web::get().to(stats))
        .route("/admin/adaptive", web::get().to(adaptive));
}

/// Prometheus text exposition; 404 when metrics are disabled
pub async fn metrics(state: web::Data<AppState>) -> Result<HttpResponse> {
    if !state.metrics.is_enabled() {
        return Ok(HttpResponse::NotFound().finish());
    }

    let body = state.metrics.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4; charset=utf-8")
        .body(body))
}

#[derive(Debug, Serialize)]
struct GateStats {
    enabled: bool,
    active: usize,
    queue_length: usize,
    max_concurrent: usize,
    max_queue_length: usize,
}

#[derive(Debug, Serialize)]
struct RateLimitStats {
    enabled: bool,
    base_limit_per_minute: u32,
    leeway: u32,
    shared_store: bool,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    metrics: MetricsSummary,
    gate: GateStats,
    rate_limit: RateLimitStats,
    adaptive: Vec<AdaptiveModelView>,
}

/// JSON summary of the gateway
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    let gate = state.executor.gate();
    let rate_limit = state.config.rate_limit();

    HttpResponse::Ok().json(StatsResponse {
        metrics: state.metrics.summary(),
        gate: GateStats {
            enabled: gate.is_enabled(),
            active: gate.active(),
            queue_length: gate.queue_len(),
            max_concurrent: gate.max_concurrent(),
            max_queue_length: gate.max_queue_length(),
        },
        rate_limit: RateLimitStats {
            enabled: rate_limit.enabled,
            base_limit_per_minute: rate_limit.base_limit_per_minute,
            leeway: rate_limit.leeway,
            shared_store: state.rate_limiter.has_shared_store(),
        },
        adaptive: state.estimator.snapshot(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdaptiveResponse {
    enabled: bool,
    models: Vec<AdaptiveModelView>,
}

/// Read-only view of the adaptive estimator
pub async fn adaptive(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(AdaptiveResponse {
        enabled: state.estimator.is_enabled(),
        models: state.estimator.snapshot(),
    })
}
