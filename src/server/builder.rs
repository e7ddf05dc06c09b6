//! Server builder and run_server function
//!
//! Command line arguments, the ServerBuilder and the run_server entry point.

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::{GatewayError, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

/// Command line arguments of the gateway binary
#[derive(Debug, Clone, Parser)]
#[command(name = "gateway", version, about)]
pub struct ServerArgs {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "GATEWAY_CONFIG", default_value = "config/gateway.yaml")]
    pub config: PathBuf,

    /// Override the bind host
    #[arg(long)]
    pub host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServerArgs {
    /// Load configuration from the file (or defaults), the environment and
    /// these arguments, in that order of precedence
    pub async fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(&self.config).await?;
        if let Some(host) = &self.host {
            config.gateway.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.gateway.server.port = port;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Server builder for easier configuration
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: Option<Config>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the HTTP server
    pub async fn build(self) -> Result<HttpServer> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::config("Configuration is required"))?;

        HttpServer::new(&config).await
    }
}

/// Run the server with a loaded configuration
pub async fn run_server(config: Config, config_path: &std::path::Path) -> Result<()> {
    info!("Starting completion gateway v{}", env!("CARGO_PKG_VERSION"));

    if config_path.exists() {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!(
            "Configuration file {} not found, running on defaults and environment",
            config_path.display()
        );
    }

    let server = ServerBuilder::new().with_config(config.clone()).build().await?;
    info!(
        "Server starting at: http://{}",
        config.server().address()
    );
    info!("API Endpoints:");
    info!("   POST /v1/chat/completions - Chat completions");
    info!("   GET  /health, /ready - Liveness and readiness");
    info!("   GET  /metrics, /stats, /admin/adaptive - Observability");

    server.start().await
}
