//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait used by every AI-assisted command.
//! A provider performs exactly one HTTP exchange per call, in one of two modes:
//!
//! - `complete`: non-streaming request, whole answer returned at once
//! - `stream`: line-delimited event stream, deltas yielded in arrival order
//!
//! ## Modules
//!
//! - `solar`: OpenAI-compatible chat completions client (Upstage Solar by default)
//! - `stream`: event line decoding for streamed responses

mod solar;
mod stream;
#[cfg(test)]
pub(crate) mod testing;

pub use solar::SolarProvider;
pub use stream::{StreamEvent, decode_events, parse_event_line};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;

use crate::constants::llm::{THINK_CLOSE, THINK_OPEN};
use crate::types::{Result, SgitError};

/// Incremental text fragments in arrival order
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// LLM provider trait
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a non-streaming request and return the cleaned answer
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Send a streaming request. Status errors are returned before any delta;
    /// the deltas themselves are raw (thinking blocks not yet stripped).
    async fn stream(&self, prompt: &str) -> Result<DeltaStream>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier sent with each request
    fn model(&self) -> &str;
}

/// Shared provider reference for the command layer
pub type SharedProvider = Arc<dyn LlmProvider>;

/// Drain a delta stream, handing each fragment to `on_delta` before it is
/// accumulated. Returns the concatenation with thinking blocks removed.
pub async fn collect_stream(
    mut deltas: DeltaStream,
    on_delta: &mut (dyn FnMut(&str) + Send),
) -> Result<String> {
    let mut accumulated = String::new();

    while let Some(delta) = deltas.next().await {
        let delta = delta?;
        on_delta(&delta);
        accumulated.push_str(&delta);
    }

    let cleaned = strip_thinking(&accumulated);
    if cleaned.is_empty() {
        return Err(SgitError::LlmApi(
            "Empty response from streaming API".to_string(),
        ));
    }
    Ok(cleaned)
}

/// Remove every `<think>...</think>` span, left to right, until no complete
/// pair remains. An opening tag without a closing tag stops the scan and the
/// rest of the text is kept as is. The result is trimmed.
pub fn strip_thinking(content: &str) -> String {
    let mut text = content.to_string();

    while let Some(start) = text.find(THINK_OPEN) {
        let Some(offset) = text[start..].find(THINK_CLOSE) else {
            break;
        };
        let end = start + offset + THINK_CLOSE.len();
        text.replace_range(start..end, "");
    }

    text.trim().to_string()
}

// =============================================================================
// Wire Types
// =============================================================================

/// One chat completion request; always a single user message
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatExchange {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatExchange {
    pub fn single(model: &str, prompt: &str, stream: bool) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamChoice {
    #[serde(default)]
    pub delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StreamDelta {
    pub content: Option<String>,
}
