//! Integration tests against a mock HTTP server: the retry loop, the SSE
//! stream surface, the fail-fast key check and the pipe-boundary error
//! rendering.

use std::time::{Duration, Instant};

use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mistral_pipe::{
    ChatMessage, ChatRequest, EmbeddingRequest, MistralClient, MistralConfig, MistralPipe, Pipe,
    PipeOutput,
};

fn config_for(server: &MockServer) -> MistralConfig {
    MistralConfig::new()
        .with_api_key("test-key")
        .with_base_url(server.uri())
}

fn chat_body(content: &str) -> serde_json::Value {
    json!({
        "model": "mistral-small-latest",
        "choices": [
            { "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ],
        "usage": { "prompt_tokens": 4, "completion_tokens": 3, "total_tokens": 7 }
    })
}

#[tokio::test]
async fn completion_returns_the_first_choice_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "mistral-small-latest" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Hello there")))
        .expect(1)
        .mount(&server)
        .await;

    let client = MistralClient::new(config_for(&server)).unwrap();
    let request = ChatRequest::new("mistral-small-latest", vec![ChatMessage::user("Hi")]);

    let completion = client.chat().complete(&request).await.unwrap();
    assert_eq!(completion.content, "Hello there");
    assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
    assert_eq!(completion.usage.unwrap().total_tokens, 7);
}

#[tokio::test]
async fn two_rate_limits_then_success_resolves_after_backoff() {
    let server = MockServer::start().await;

    // First two attempts are rejected with 429, the third succeeds. The
    // backoff loop should wait ~1s, then ~2s, then return the 200 content.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("third time lucky")))
        .expect(1)
        .mount(&server)
        .await;

    let client = MistralClient::new(config_for(&server)).unwrap();
    let request = ChatRequest::new("mistral-small-latest", vec![ChatMessage::user("Hi")]);

    let started = Instant::now();
    let completion = client.chat().complete(&request).await.unwrap();

    assert_eq!(completion.content, "third time lucky");
    assert!(
        started.elapsed() >= Duration::from_secs(3),
        "expected 1s + 2s of backoff, got {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn retry_exhaustion_surfaces_as_error_text_at_the_pipe() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("still limited"))
        .expect(1)
        .mount(&server)
        .await;

    // Bound of one attempt so the test does not sleep.
    let config = config_for(&server).with_max_retries(1);
    let pipe = MistralPipe::new(config).unwrap();

    let output = pipe
        .pipe(json!({
            "model": "mistral.mistral-small-latest",
            "messages": [{ "role": "user", "content": "Hi" }]
        }))
        .await;

    let text = output.collect_text().await;
    assert!(text.starts_with("Error:"), "got: {}", text);
    assert!(text.contains("Rate limited"), "got: {}", text);
}

#[tokio::test]
async fn stream_yields_fragments_and_stops_at_done() {
    let server = MockServer::start().await;

    let sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"!\"}}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "stream": true })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = MistralClient::new(config_for(&server)).unwrap();
    let request = ChatRequest::new("mistral-small-latest", vec![ChatMessage::user("Hi")]);

    let mut stream = client.chat().stream(&request).await.unwrap();
    let mut fragments = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        if chunk.done {
            break;
        }
        fragments.push(chunk.text);
    }

    assert_eq!(fragments, vec!["Hi", "!"]);
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn malformed_stream_line_is_skipped_not_fatal() {
    let server = MockServer::start().await;

    let sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"before\"}}]}\n\n",
        "data: {this is not json\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"after\"}}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .mount(&server)
        .await;

    let client = MistralClient::new(config_for(&server)).unwrap();
    let request = ChatRequest::new("mistral-small-latest", vec![ChatMessage::user("Hi")]);

    let stream = client.chat().stream(&request).await.unwrap();
    let fragments: Vec<String> = stream
        .filter_map(|chunk| async move {
            let chunk = chunk.ok()?;
            (!chunk.done).then_some(chunk.text)
        })
        .collect()
        .await;

    assert_eq!(fragments, vec!["before", "after"]);
}

#[tokio::test]
async fn finish_reason_stop_ends_the_stream_early() {
    let server = MockServer::start().await;

    // The "ignored" fragment sits behind the stop event and must never
    // surface.
    let sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"only\"},\"finish_reason\":\"stop\"}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .mount(&server)
        .await;

    let pipe = MistralPipe::new(config_for(&server)).unwrap();
    let output = pipe
        .pipe(json!({
            "model": "mistral-small-latest",
            "messages": [{ "role": "user", "content": "Hi" }],
            "stream": true
        }))
        .await;

    match output {
        PipeOutput::Stream(fragments) => {
            let rendered: Vec<String> = fragments.collect().await;
            assert_eq!(rendered, vec!["only"]);
        }
        other => panic!("expected a stream, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_api_key_fails_every_operation_without_touching_the_network() {
    let server = MockServer::start().await;
    let config = MistralConfig::new().with_base_url(server.uri());

    let client = MistralClient::new(config.clone()).unwrap();
    let request = ChatRequest::new("mistral-small-latest", vec![ChatMessage::user("Hi")]);

    assert!(client.catalog().list_models().await.is_err());
    assert!(client.chat().complete(&request).await.is_err());
    assert!(client.chat().stream(&request).await.is_err());
    assert!(client
        .embeddings()
        .embed(EmbeddingRequest::single("text"))
        .await
        .is_err());

    let pipe = MistralPipe::new(config).unwrap();
    assert!(pipe.pipes().await.is_empty());

    let received = server.received_requests().await.unwrap();
    assert!(received.is_empty(), "no request may leave the process");
}

#[tokio::test]
async fn catalog_is_curated_and_empty_on_http_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {
                    "id": "mistral-small-2409",
                    "capabilities": { "completion_chat": true }
                },
                {
                    "id": "mistral-small-latest",
                    "name": "Mistral Small",
                    "capabilities": { "completion_chat": true },
                    "aliases": ["mistral-small-2409"]
                },
                {
                    "id": "mistral-embed",
                    "capabilities": { "completion_chat": false }
                }
            ]
        })))
        .mount(&server)
        .await;

    let pipe = MistralPipe::new(config_for(&server)).unwrap();
    let models = pipe.pipes().await;

    assert_eq!(models.len(), 1);
    assert_eq!(models[0].id, "mistral-small-latest");
    assert_eq!(models[0].name, "Mistral Small");

    // A broken catalog endpoint renders as an empty menu, not an error.
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&broken)
        .await;

    let pipe = MistralPipe::new(config_for(&broken)).unwrap();
    assert!(pipe.pipes().await.is_empty());
}

#[tokio::test]
async fn pipe_dispatch_strips_the_namespace_before_forwarding() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "mistral-tiny" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let pipe = MistralPipe::new(config_for(&server)).unwrap();
    let output = pipe
        .pipe(json!({
            "model": "mistral.mistral-tiny",
            "messages": [{ "role": "user", "content": "Hi" }]
        }))
        .await;

    assert_eq!(output.collect_text().await, "ok");
}

#[tokio::test]
async fn embeddings_come_back_in_request_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(json!({
            "model": "mistral-embed",
            "input": ["first", "second"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "mistral-embed",
            "data": [
                { "index": 1, "embedding": [0.4, 0.5] },
                { "index": 0, "embedding": [0.1, 0.2] }
            ],
            "usage": { "prompt_tokens": 2, "total_tokens": 2 }
        })))
        .mount(&server)
        .await;

    let client = MistralClient::new(config_for(&server)).unwrap();
    let response = client
        .embeddings()
        .embed(EmbeddingRequest::new(vec![
            "first".to_string(),
            "second".to_string(),
        ]))
        .await
        .unwrap();

    assert_eq!(response.model, "mistral-embed");
    assert_eq!(response.embeddings, vec![vec![0.1, 0.2], vec![0.4, 0.5]]);
}

#[tokio::test]
async fn auth_rejection_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let client = MistralClient::new(config_for(&server)).unwrap();
    let request = ChatRequest::new("mistral-small-latest", vec![ChatMessage::user("Hi")]);

    let err = client.chat().complete(&request).await.unwrap_err();
    assert!(err.to_string().contains("Authentication"), "got: {}", err);
}
