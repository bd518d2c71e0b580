use serde::{Deserialize, Serialize};

/// Token accounting as reported by the vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One increment of streamed completion output.
///
/// `done` marks the terminator: the `[DONE]` sentinel or a reported finish
/// reason. Terminal chunks carry no text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub text: String,
    pub done: bool,
    pub finish_reason: Option<String>,
}

impl StreamChunk {
    pub fn fragment(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
            finish_reason: None,
        }
    }

    pub fn finished(finish_reason: Option<String>) -> Self {
        Self {
            text: String::new(),
            done: true,
            finish_reason,
        }
    }
}
