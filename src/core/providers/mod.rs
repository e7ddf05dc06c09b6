//! Upstream providers
//!
//! The gateway treats the upstream as an opaque asynchronous operation that
//! either yields a completion or fails with a status-coded [`ProviderError`].

pub mod error;
pub mod openai_compatible;

pub use error::ProviderError;
pub use openai_compatible::OpenAICompatibleProvider;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;

/// Raw server-sent event bytes coming back from the upstream
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, ProviderError>> + Send>>;

/// A chat completion backend
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    /// Short provider name used in errors and logs
    fn name(&self) -> &'static str;

    /// Non-streaming chat completion; request and response are passed through as JSON
    async fn chat_completion(&self, request: Value) -> Result<Value, ProviderError>;

    /// Streaming chat completion; yields SSE bytes as the upstream produces them
    async fn chat_completion_stream(&self, request: Value) -> Result<ChunkStream, ProviderError>;
}
