//! OpenAI-compatible upstream client

use super::{ChunkStream, ProviderError, UpstreamProvider};
use crate::config::UpstreamConfig;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const PROVIDER_NAME: &str = "upstream";

/// Client for any endpoint speaking the OpenAI chat completions wire format
#[derive(Debug, Clone)]
pub struct OpenAICompatibleProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenAICompatibleProvider {
    /// Create a new provider from configuration
    pub fn new(config: &UpstreamConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ProviderError::configuration(PROVIDER_NAME, e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.chat_completions_url(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, body: &Value) -> reqwest::RequestBuilder {
        let builder = self.client.post(&self.endpoint).json(body);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Send the request and turn any non-2xx answer into a [`ProviderError`]
    async fn send(&self, body: &Value) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .request(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER_NAME, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let text = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Upstream returned an error status");
        Err(ProviderError::from_status(
            PROVIDER_NAME,
            status.as_u16(),
            &headers,
            &text,
        ))
    }
}

#[async_trait]
impl UpstreamProvider for OpenAICompatibleProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn chat_completion(&self, request: Value) -> Result<Value, ProviderError> {
        let response = self.send(&request).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::response_parsing(PROVIDER_NAME, e.to_string()))
    }

    async fn chat_completion_stream(&self, mut request: Value) -> Result<ChunkStream, ProviderError> {
        if let Some(object) = request.as_object_mut() {
            object.insert("stream".to_string(), Value::Bool(true));
        }

        let response = self.send(&request).await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ProviderError::streaming(PROVIDER_NAME, e.to_string())));

        Ok(Box::pin(stream))
    }
}
