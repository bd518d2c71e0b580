use serde::{Deserialize, Serialize};

use crate::models::common::TokenUsage;

/// Inputs for an embedding call. `model_id` falls back to the vendor's
/// default embedding model when unset.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub texts: Vec<String>,
    pub model_id: Option<String>,
}

impl EmbeddingRequest {
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            model_id: None,
        }
    }

    pub fn single(text: impl Into<String>) -> Self {
        Self::new(vec![text.into()])
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }
}

/// Embedding vectors in the same order as the request texts.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingResponse {
    pub model: String,
    pub embeddings: Vec<Vec<f32>>,
    pub usage: Option<TokenUsage>,
}

// Wire shapes of the embeddings endpoint.

#[derive(Debug, Deserialize)]
pub struct EmbeddingApiResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}
