//! Health check and readiness endpoints

use crate::server::state::AppState;
use crate::{BuildInfo, build_info};
use actix_web::{HttpResponse, web};
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness));
}

/// Basic health status
#[derive(Debug, Clone, Serialize)]
struct HealthStatus {
    status: Cow<'static, str>,
    timestamp: chrono::DateTime<chrono::Utc>,
    build: BuildInfo,
}

/// Liveness: the process is up and serving
pub async fn health_check() -> HttpResponse {
    debug!("Health check requested");

    HttpResponse::Ok().json(HealthStatus {
        status: Cow::Borrowed("healthy"),
        timestamp: chrono::Utc::now(),
        build: build_info(),
    })
}

/// Readiness: 200 when the shared store answers and the queue is below its
/// high-water mark, 503 otherwise
pub async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    let report = state.readiness.refresh().await;
    if report.ready {
        HttpResponse::Ok().json(report)
    } else {
        HttpResponse::ServiceUnavailable().json(report)
    }
}
