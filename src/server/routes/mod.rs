//! HTTP route modules
//!
//! - `chat`: the OpenAI-compatible chat completions endpoint
//! - `health`: liveness and readiness
//! - `observability`: metrics, stats and the adaptive estimator view

pub mod chat;
pub mod health;
pub mod observability;


use actix_web::web;

/// Configure all gateway routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(chat::configure_routes)
        .configure(health::configure_routes)
        .configure(observability::configure_routes);
}
