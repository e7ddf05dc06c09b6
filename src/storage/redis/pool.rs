//! Redis connection management
//!
//! A single multiplexed connection is shared by all callers. It is opened
//! lazily and dropped after a failed command so the next call reconnects.

use crate::config::RedisConfig;
use crate::utils::error::{GatewayError, Result};
use crate::utils::sanitize_url;
use parking_lot::RwLock;
use redis::{Client, aio::MultiplexedConnection};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Redis connection pool
#[derive(Debug)]
pub struct RedisPool {
    client: Client,
    connection: RwLock<Option<MultiplexedConnection>>,
    pub(super) script: redis::Script,
    timeout: Duration,
    display_url: String,
}

impl RedisPool {
    /// Create a new pool; no I/O happens until the first command
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let display_url = sanitize_url(&config.url);
        info!("Creating Redis connection pool for {}", display_url);

        let client = Client::open(config.url.as_str()).map_err(GatewayError::Redis)?;

        Ok(Self {
            client,
            connection: RwLock::new(None),
            script: super::token_bucket::script(),
            timeout: config.timeout(),
            display_url,
        })
    }

    /// URL with the password masked
    pub fn display_url(&self) -> &str {
        &self.display_url
    }

    /// Get the shared connection, opening it if needed
    pub(super) async fn connection(&self) -> Result<MultiplexedConnection> {
        if let Some(conn) = self.connection.read().as_ref() {
            return Ok(conn.clone());
        }

        debug!("Opening Redis connection to {}", self.display_url);
        let conn = self
            .with_timeout(self.client.get_multiplexed_async_connection())
            .await?;

        *self.connection.write() = Some(conn.clone());
        Ok(conn)
    }

    /// Forget the cached connection after a failure
    pub(super) fn invalidate(&self) {
        self.connection.write().take();
    }

    /// Run a Redis future under the configured timeout
    pub(super) async fn with_timeout<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(GatewayError::Redis),
            Err(_) => Err(GatewayError::store(format!(
                "Redis call timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let result: Result<String> = self
            .with_timeout(redis::cmd("PING").query_async(&mut conn))
            .await;

        if result.is_err() {
            self.invalidate();
        }
        result.map(|_| ())
    }
}
