//! HTTP server core implementation
//!
//! This module provides the HttpServer struct and its core methods.

use crate::config::{Config, ServerConfig};
use crate::server::middleware::{MetricsMiddleware, RequestIdMiddleware};
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::DefaultHeaders,
    web,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let state = AppState::new(config.clone()).await?;
        Ok(Self::with_state(state))
    }

    /// Create a server around prepared state
    pub fn with_state(state: AppState) -> Self {
        Self {
            config: state.config.server().clone(),
            state,
        }
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let max_body_size = state.config.server().max_body_size;
        let metrics = Arc::clone(&state.metrics);

        App::new()
            .app_data(state)
            .app_data(web::JsonConfig::default().limit(max_body_size))
            .wrap(MetricsMiddleware::new(metrics))
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .wrap(DefaultHeaders::new().add(("Server", "completion-gateway")))
            .configure(routes::configure_routes)
    }

    /// Start the HTTP server
    ///
    /// Runs until SIGINT/SIGTERM, then drains connections, stops the
    /// background tasks and saves the adaptive snapshot.
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let port = self.config.port;
        let workers = self.config.worker_count();

        info!("Starting HTTP server on {} with {} workers", bind_addr, workers);

        let state = self.state.clone();
        let data = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || Self::create_app(data.clone()))
            .workers(workers)
            .client_request_timeout(Duration::from_secs(self.config.timeout))
            .disable_signals()
            .bind(&bind_addr)
            .map_err(|e| Self::format_bind_error(e, &bind_addr, port))?
            .run();

        let handle = server.handle();
        tokio::spawn(async move {
            Self::shutdown_signal().await;
            handle.stop(true).await;
        });

        let tasks = state.start_background_tasks();
        info!("HTTP server listening on {}", bind_addr);

        let result = server.await;

        AppState::stop_background_tasks(tasks).await;
        state.save_snapshot().await;
        info!("HTTP server stopped");

        result.map_err(Into::into)
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
