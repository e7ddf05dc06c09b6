//! Streaming execution
//!
//! The gate permit moves into the returned stream, so the slot stays taken
//! until the stream ends or the caller drops it.

use super::execute::{UpstreamExecutor, record_failure};
use crate::core::providers::{ChunkStream, ProviderError};
use crate::core::usage::{SseUsageAccumulator, TokenUsage};
use crate::utils::error::{GatewayError, Result};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

impl UpstreamExecutor {
    /// Open an upstream stream for `model` inside a gate slot
    ///
    /// Completion tokens are accounted chunk by chunk. A clean end counts as
    /// a success; a 429 raised mid-stream counts as a reject.
    pub async fn execute_stream<F, Fut>(
        &self,
        model: &str,
        prompt_estimate: u64,
        op: F,
    ) -> Result<ChunkStream>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<ChunkStream, ProviderError>>,
    {
        let permit = self.acquire().await?;
        let started = Instant::now();

        let mut upstream = match op().await {
            Ok(stream) => stream,
            Err(err) => {
                self.on_upstream_failure(model, &err, started.elapsed());
                return Err(GatewayError::Provider(err));
            }
        };

        let estimator = Arc::clone(&self.estimator);
        let metrics = Arc::clone(&self.metrics);
        let model = model.to_string();

        let stream = async_stream::stream! {
            let _permit = permit;
            let mut usage = SseUsageAccumulator::new();
            let mut failed = false;

            while let Some(item) = upstream.next().await {
                match item {
                    Ok(chunk) => {
                        let delta = usage.feed(&chunk);
                        if delta > 0 {
                            metrics.record_tokens(
                                &model,
                                TokenUsage {
                                    prompt_tokens: 0,
                                    completion_tokens: delta,
                                },
                            );
                        }
                        yield Ok(chunk);
                    }
                    Err(err) => {
                        record_failure(&estimator, &metrics, &model, &err);
                        failed = true;
                        yield Err(err);
                        break;
                    }
                }
            }

            if !failed {
                estimator.on_success(&model);
                // Completion tokens already counted; top up to the reported usage if any
                let total = usage.finish(prompt_estimate);
                metrics.record_tokens(
                    &model,
                    TokenUsage {
                        prompt_tokens: total.prompt_tokens,
                        completion_tokens: total
                            .completion_tokens
                            .saturating_sub(usage.counted_tokens()),
                    },
                );
            }
            metrics.observe_upstream(&model, started.elapsed());
        };

        Ok(Box::pin(stream))
    }
}
