use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::common::TokenUsage;

/// Process-level generation defaults, applied when a request leaves a
/// parameter unspecified.
pub mod defaults {
    pub const TEMPERATURE: f32 = 0.7;
    pub const TOP_P: f32 = 0.9;
    pub const MAX_TOKENS: u32 = 4096;

    pub(super) fn temperature() -> Option<f32> {
        Some(TEMPERATURE)
    }

    pub(super) fn top_p() -> Option<f32> {
        Some(TOP_P)
    }

    pub(super) fn max_tokens() -> Option<u32> {
        Some(MAX_TOKENS)
    }
}

/// One conversation turn. The content is forwarded untouched — plain text
/// for ordinary turns, richer structures whenever the host sends them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Value,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: Value) -> Self {
        Self {
            role: role.into(),
            content,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", Value::String(content.into()))
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", Value::String(content.into()))
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", Value::String(content.into()))
    }
}

/// Sampling overrides. A field that is absent when deserializing takes the
/// process default; an explicit `null` stays `None` and is later left out
/// of the outgoing payload entirely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerationParams {
    #[serde(default = "defaults::temperature")]
    pub temperature: Option<f32>,
    #[serde(default = "defaults::top_p")]
    pub top_p: Option<f32>,
    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: Option<u32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: defaults::temperature(),
            top_p: defaults::top_p(),
            max_tokens: defaults::max_tokens(),
        }
    }
}

/// A fully-resolved completion request: vendor model id (namespace already
/// stripped), ordered history, sampling parameters.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub params: GenerationParams,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// Distilled result of a non-streaming completion.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletion {
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

// Wire shapes of the chat completions endpoint.

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: String,
}

/// One decoded event of the streaming response.
#[derive(Debug, Deserialize)]
pub struct ChatStreamEvent {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: StreamDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub content: Option<String>,
}
