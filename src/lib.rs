//! # Completion Gateway
//!
//! An HTTP gateway in front of an OpenAI-compatible chat completion API. It
//! keeps the upstream wire contract and adds operational controls:
//!
//! - **Admission control**: per key and model token buckets in Redis, with an
//!   in-process fixed window when the store is unavailable
//! - **Bounded concurrency**: a FIFO wait queue with overflow and timeout
//!   rejections in front of the upstream
//! - **Adaptive limits**: per-model requests-per-minute ceilings learned from
//!   upstream 429 responses, persisted as a warm-up snapshot
//! - **Observability**: Prometheus metrics, a JSON summary and readiness
//!
//! ## Gateway Mode
//!
//! ```rust,no_run
//! use completion_gateway::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config/gateway.yaml").await?;
//!     let gateway = Gateway::new(config).await?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

// Public module exports
pub mod config;
pub mod core;
pub mod monitoring;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::providers::{ProviderError, UpstreamProvider};
pub use utils::error::{AdmissionRejection, GatewayError, RejectionReason, Result};

use tracing::info;

/// A gateway process: configuration plus its HTTP server
pub struct Gateway {
    config: Config,
    server: server::HttpServer,
}

impl Gateway {
    /// Create a new gateway instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating new gateway instance");

        let server = server::HttpServer::new(&config).await?;

        Ok(Self { config, server })
    }

    /// Run the gateway server until shutdown
    pub async fn run(self) -> Result<()> {
        info!("Starting completion gateway on {}", self.config.server().address());
        self.server.start().await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Gateway build information
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp (seconds since the epoch)
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

/// Build
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
