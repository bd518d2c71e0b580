use serde_json::json;

use crate::{
    config::MistralConfig,
    error::{PipeError, Result},
    models::{EmbeddingApiResponse, EmbeddingRequest, EmbeddingResponse},
};

use super::error_for_status;

/// Model used when an embedding request names none.
pub const DEFAULT_EMBEDDING_MODEL: &str = "mistral-embed";

#[derive(Clone)]
pub struct EmbeddingClient {
    http: reqwest::Client,
    config: MistralConfig,
}

impl EmbeddingClient {
    pub fn new(http: reqwest::Client, config: MistralConfig) -> Self {
        Self { http, config }
    }

    /// Embeds a batch of texts. Vectors come back in request order. No
    /// retry policy applies here; a rate limit surfaces directly.
    pub async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        if request.texts.is_empty() {
            return Err(PipeError::MissingField(
                "embedding request carried no texts".into(),
            ));
        }

        let model_id = request
            .model_id
            .as_deref()
            .unwrap_or(DEFAULT_EMBEDDING_MODEL);
        let url = format!("{}/embeddings", self.config.endpoint_base());

        log::info!(
            "Embedding {} text(s) with {}",
            request.texts.len(),
            model_id
        );

        let payload = json!({
            "model": model_id,
            "input": request.texts,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.api_key()?)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PipeError::Network(format!("embedding request failed: {}", e)))?;
        let response = error_for_status(response, "embeddings").await?;

        let api: EmbeddingApiResponse = response
            .json()
            .await
            .map_err(|e| PipeError::Response(format!("malformed embedding response: {}", e)))?;

        if api.data.is_empty() {
            return Err(PipeError::Response(
                "embedding response carried no data".into(),
            ));
        }

        let mut data = api.data;
        data.sort_by_key(|entry| entry.index);

        Ok(EmbeddingResponse {
            model: api.model.unwrap_or_else(|| model_id.to_string()),
            embeddings: data.into_iter().map(|entry| entry.embedding).collect(),
            usage: api.usage,
        })
    }
}
