use std::pin::Pin;

use futures::stream::{Stream, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    config::MistralConfig,
    error::{PipeError, Result},
    models::{ChatCompletion, ChatCompletionResponse, ChatRequest, ChatStreamEvent, StreamChunk},
    retry::retry_with_backoff,
    sse::{SseEvent, SseParser},
};

use super::error_for_status;

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: MistralConfig,
}

impl ChatClient {
    pub fn new(http: reqwest::Client, config: MistralConfig) -> Self {
        Self { http, config }
    }

    /// Single-shot completion. Rate-limited attempts are retried with
    /// exponential backoff before the failure is surfaced; the result is
    /// the first choice's message.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let payload = build_payload(request, false);
        log::info!("Requesting completion from {}", request.model);
        log::debug!("Completion payload: {}", payload);

        let response = retry_with_backoff(
            self.config.max_retries,
            |_| self.post_completions(&payload),
            PipeError::is_retryable,
        )
        .await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| PipeError::Response(format!("malformed completion: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PipeError::Response("completion carried no choices".into()))?;

        Ok(ChatCompletion {
            content: choice.message.content,
            model: completion.model.unwrap_or_else(|| request.model.clone()),
            finish_reason: choice.finish_reason,
            usage: completion.usage,
        })
    }

    /// Streaming completion. Fragments are yielded as the server emits
    /// them; the stream closes after a terminal event. Retries restart the
    /// whole request, never a partial stream.
    pub async fn stream(
        &self,
        request: &ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>> {
        let payload = build_payload(request, true);
        log::info!("Opening completion stream from {}", request.model);

        let response = retry_with_backoff(
            self.config.max_stream_retries,
            |_| self.post_completions(&payload),
            PipeError::is_retryable,
        )
        .await?;

        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut parser = SseParser::new();

            while let Some(next) = body.next().await {
                let bytes = match next {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx
                            .send(Err(PipeError::Network(format!(
                                "stream interrupted: {}",
                                e
                            ))))
                            .await;
                        return;
                    }
                };

                for event in parser.push(&String::from_utf8_lossy(&bytes)) {
                    if !forward_event(&tx, event).await {
                        return;
                    }
                }
            }

            if let Some(event) = parser.finish() {
                if !forward_event(&tx, event).await {
                    return;
                }
            }

            // Body ended without a terminal event; close out cleanly.
            let _ = tx.send(Ok(StreamChunk::finished(None))).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn post_completions(&self, payload: &Value) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.config.endpoint_base());
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.api_key()?)
            .json(payload)
            .send()
            .await
            .map_err(|e| PipeError::Network(format!("completion request failed: {}", e)))?;

        error_for_status(response, "chat completions").await
    }
}

/// Decodes one server-sent event and pushes the pieces the consumer cares
/// about. Returns false once the stream is finished or the receiver is
/// gone.
async fn forward_event(tx: &mpsc::Sender<Result<StreamChunk>>, event: SseEvent) -> bool {
    let line = match event {
        SseEvent::Done => {
            let _ = tx.send(Ok(StreamChunk::finished(None))).await;
            return false;
        }
        SseEvent::Data(line) => line,
    };

    let event: ChatStreamEvent = match serde_json::from_str(&line) {
        Ok(event) => event,
        Err(e) => {
            // A malformed frame is skipped, never fatal.
            log::warn!("Skipping undecodable stream line: {}", e);
            return true;
        }
    };

    let Some(choice) = event.choices.into_iter().next() else {
        return true;
    };

    if let Some(text) = choice.delta.content {
        if !text.is_empty() && tx.send(Ok(StreamChunk::fragment(text))).await.is_err() {
            return false;
        }
    }

    if choice.finish_reason.as_deref() == Some("stop") {
        let _ = tx
            .send(Ok(StreamChunk::finished(choice.finish_reason)))
            .await;
        return false;
    }

    true
}

/// Request body for the chat completions endpoint. Unset sampling
/// parameters are left out entirely so the server applies its own
/// defaults.
fn build_payload(request: &ChatRequest, stream: bool) -> Value {
    let mut payload = json!({
        "model": request.model,
        "messages": request.messages,
    });

    if let Some(map) = payload.as_object_mut() {
        let params = &request.params;
        if let Some(temperature) = params.temperature {
            map.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(top_p) = params.top_p {
            map.insert("top_p".to_string(), json!(top_p));
        }
        if let Some(max_tokens) = params.max_tokens {
            map.insert("max_tokens".to_string(), json!(max_tokens));
        }
        if stream {
            map.insert("stream".to_string(), json!(true));
        }
    }

    payload
}
