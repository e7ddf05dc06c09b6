//! Upstream provider configuration

use super::*;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible upstream provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the chat completions API (without `/chat/completions`)
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<String>,
    /// Upstream request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            timeout: default_upstream_timeout(),
        }
    }
}

impl UpstreamConfig {
    /// Chat completions endpoint URL
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}
