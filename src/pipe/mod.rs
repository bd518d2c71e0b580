pub mod traits;

use std::pin::Pin;

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;

use crate::{
    config::MistralConfig,
    error::{PipeError, Result},
    mistral::MistralClient,
    models::{ChatMessage, ChatRequest, GenerationParams, StreamChunk},
};

pub use traits::{Pipe, PipeModel, PipeOutput, TextStream};

pub const PIPE_KIND: &str = "manifold";
pub const PIPE_ID: &str = "mistral";
pub const PIPE_NAME: &str = "Mistral";

/// The Mistral adapter: one pipe fronting the vendor's whole chat catalog.
pub struct MistralPipe {
    client: MistralClient,
}

impl MistralPipe {
    pub fn new(config: MistralConfig) -> Result<Self> {
        Ok(Self {
            client: MistralClient::new(config)?,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(MistralConfig::from_env())
    }

    pub fn client(&self) -> &MistralClient {
        &self.client
    }

    async fn dispatch(&self, body: &Value) -> Result<PipeOutput> {
        let model = body
            .get("model")
            .and_then(Value::as_str)
            .ok_or_else(|| PipeError::MissingField("request body carries no model".into()))?;
        let model = normalize_model_id(model);

        let messages: Vec<ChatMessage> = match body.get("messages") {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| PipeError::Serialization(format!("malformed messages: {}", e)))?,
            None => {
                return Err(PipeError::MissingField(
                    "request body carries no messages".into(),
                ))
            }
        };

        let params: GenerationParams = serde_json::from_value(body.clone()).map_err(|e| {
            PipeError::Serialization(format!("malformed generation parameters: {}", e))
        })?;

        let request = ChatRequest::new(model, messages).with_params(params);

        if wants_stream(body) {
            let chunks = self.client.chat().stream(&request).await?;
            Ok(PipeOutput::Stream(fragment_stream(chunks)))
        } else {
            let completion = self.client.chat().complete(&request).await?;
            Ok(PipeOutput::Text(completion.content))
        }
    }
}

#[async_trait]
impl Pipe for MistralPipe {
    fn kind(&self) -> &str {
        PIPE_KIND
    }

    fn id(&self) -> &str {
        PIPE_ID
    }

    fn name(&self) -> &str {
        PIPE_NAME
    }

    async fn pipes(&self) -> Vec<PipeModel> {
        match self.client.catalog().list_models().await {
            Ok(models) => models
                .iter()
                .map(|model| PipeModel {
                    id: model.id.clone(),
                    name: model.display_name().to_string(),
                })
                .collect(),
            Err(e) => {
                // The menu must always render; a broken catalog shows empty.
                log::error!("Model listing failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn pipe(&self, body: Value) -> PipeOutput {
        match self.dispatch(&body).await {
            Ok(output) => output,
            Err(e) => {
                log::error!("Pipe dispatch failed: {}", e);
                let message = format!("Error: {}", e);
                if wants_stream(&body) {
                    PipeOutput::Stream(Box::pin(stream::once(future::ready(message))))
                } else {
                    PipeOutput::Text(message)
                }
            }
        }
    }
}

fn wants_stream(body: &Value) -> bool {
    body.get("stream").and_then(Value::as_bool).unwrap_or(false)
}

/// Strips the host-side namespace off a model id ("mistral.mistral-small"
/// → "mistral-small"). Foreign or absent namespaces pass through.
fn normalize_model_id(model: &str) -> &str {
    match model.split_once('.') {
        Some((namespace, rest)) if namespace == PIPE_ID => rest,
        _ => model,
    }
}

/// Renders typed chunks for the host: fragments keep their text, terminal
/// markers vanish, and a failure becomes one last "Error: ..." fragment.
fn fragment_stream(chunks: Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>) -> TextStream {
    let fragments = chunks.filter_map(|item| {
        future::ready(match item {
            Ok(chunk) if chunk.text.is_empty() => None,
            Ok(chunk) => Some(chunk.text),
            Err(e) => Some(format!("Error: {}", e)),
        })
    });

    Box::pin(fragments)
}
