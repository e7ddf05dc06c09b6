//! Approximate token accounting
//!
//! Upstream `usage` blocks are preferred. When they are missing, tokens are
//! approximated as one token per four characters, plus a fixed overhead per
//! prompt message.

use serde::Serialize;
use serde_json::Value;

/// Fixed per-message overhead added to prompt estimates
pub const TOKENS_PER_MESSAGE: u64 = 4;

/// Characters per approximated token
const CHARS_PER_TOKEN: u64 = 4;

/// Prompt and completion token counts for one upstream call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Approximate the token count of a piece of text
pub fn estimate_tokens(text: &str) -> u64 {
    tokens_for_chars(text.chars().count() as u64)
}

fn tokens_for_chars(chars: u64) -> u64 {
    chars.div_ceil(CHARS_PER_TOKEN)
}

/// Approximate prompt tokens of a chat completion request body
pub fn estimate_prompt_tokens(request: &Value) -> u64 {
    let Some(messages) = request.get("messages").and_then(Value::as_array) else {
        return 0;
    };

    messages
        .iter()
        .map(|message| {
            let content = message.get("content").map(content_chars).unwrap_or(0);
            tokens_for_chars(content) + TOKENS_PER_MESSAGE
        })
        .sum()
}

/// Count characters of a message `content`, which is either a string or a list of parts
fn content_chars(content: &Value) -> u64 {
    match content {
        Value::String(text) => text.chars().count() as u64,
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .map(|text| text.chars().count() as u64)
            .sum(),
        _ => 0,
    }
}

/// Parse an OpenAI `usage` object
fn parse_usage(usage: &Value) -> Option<TokenUsage> {
    let prompt_tokens = usage.get("prompt_tokens").and_then(Value::as_u64)?;
    let completion_tokens = usage
        .get("completion_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    Some(TokenUsage {
        prompt_tokens,
        completion_tokens,
    })
}

/// A successful upstream result the executor can account usage for
pub trait UsageSource {
    /// Usage reported by the upstream, if any
    fn reported_usage(&self) -> Option<TokenUsage>;

    /// Completion tokens approximated from the generated text
    fn approximate_completion_tokens(&self) -> u64;

    /// Reported usage, or the approximation with the given prompt estimate
    fn usage_or_estimate(&self, prompt_estimate: u64) -> TokenUsage {
        self.reported_usage().unwrap_or_else(|| TokenUsage {
            prompt_tokens: prompt_estimate,
            completion_tokens: self.approximate_completion_tokens(),
        })
    }
}

impl UsageSource for Value {
    fn reported_usage(&self) -> Option<TokenUsage> {
        self.get("usage").and_then(parse_usage)
    }

    fn approximate_completion_tokens(&self) -> u64 {
        let Some(choices) = self.get("choices").and_then(Value::as_array) else {
            return 0;
        };

        let chars: u64 = choices
            .iter()
            .map(|choice| {
                choice
                    .pointer("/message/content")
                    .or_else(|| choice.get("text"))
                    .map(content_chars)
                    .unwrap_or(0)
            })
            .sum();
        tokens_for_chars(chars)
    }
}

/// Incremental completion token counter over a server-sent event stream
///
/// Lines split across network chunks are buffered until complete.
#[derive(Debug, Default)]
pub struct SseUsageAccumulator {
    pending: Vec<u8>,
    completion_chars: u64,
    counted_tokens: u64,
    reported: Option<TokenUsage>,
}

impl SseUsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns completion tokens newly accounted by this chunk
    pub fn feed(&mut self, chunk: &[u8]) -> u64 {
        self.pending.extend_from_slice(chunk);

        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            self.process_line(String::from_utf8_lossy(&line).trim_end());
        }

        let total = tokens_for_chars(self.completion_chars);
        let delta = total.saturating_sub(self.counted_tokens);
        self.counted_tokens = total;
        delta
    }

    fn process_line(&mut self, line: &str) {
        let Some(data) = line.strip_prefix("data:") else {
            return;
        };
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            return;
        }

        let Ok(event) = serde_json::from_str::<Value>(data) else {
            return;
        };

        if let Some(usage) = event.get("usage").and_then(parse_usage) {
            self.reported = Some(usage);
        }

        if let Some(choices) = event.get("choices").and_then(Value::as_array) {
            for choice in choices {
                if let Some(content) = choice.pointer("/delta/content") {
                    self.completion_chars += content_chars(content);
                }
            }
        }
    }

    /// Completion tokens accounted so far
    pub fn counted_tokens(&self) -> u64 {
        self.counted_tokens
    }

    /// Final usage: the upstream report when one arrived, otherwise the approximation
    pub fn finish(&self, prompt_estimate: u64) -> TokenUsage {
        self.reported.unwrap_or(TokenUsage {
            prompt_tokens: prompt_estimate,
            completion_tokens: self.counted_tokens,
        })
    }
}
