use futures::StreamExt;
use mistral_pipe::{EmbeddingRequest, MistralConfig, MistralPipe, Pipe, PipeOutput};
use serde_json::json;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    mistral_pipe::logger::init_with_config(
        mistral_pipe::logger::LoggerConfig::development()
            .with_level(mistral_pipe::logger::LogLevel::Debug),
    )?;

    log::info!("🔍 Checking Mistral environment...");

    match env::var("MISTRAL_API_KEY") {
        Ok(key) if !key.is_empty() => {
            log::info!("✅ MISTRAL_API_KEY found in environment");
            log::debug!("API key starts with: {}...", &key[..4.min(key.len())]);
        }
        _ => {
            log::warn!("⚠️  No MISTRAL_API_KEY in environment variables");
            log::error!("❌ Every API call below will fail with a configuration error");
        }
    }

    if let Ok(base_url) = env::var("MISTRAL_API_BASE_URL") {
        log::info!("MISTRAL_API_BASE_URL: {}", base_url);
    } else {
        log::info!("No MISTRAL_API_BASE_URL set, using the default endpoint");
    }

    let config = MistralConfig::from_env();
    mistral_pipe::logger::log_config_info(&config);

    log::info!("🔄 Creating Mistral pipe...");
    let pipe = match MistralPipe::new(config) {
        Ok(pipe) => {
            log::info!("✅ Mistral pipe initialized successfully");
            pipe
        }
        Err(e) => {
            log::error!("❌ Failed to initialize Mistral pipe: {}", e);
            return Err(e.into());
        }
    };

    // Test 1: Model catalog
    log::info!("📚 Fetching the curated model catalog...");
    let models = pipe.pipes().await;
    if models.is_empty() {
        log::warn!("⚠️  Catalog came back empty (missing key or unreachable API?)");
    }
    for model in &models {
        log::info!("  {} - {}", model.id, model.name);
    }

    log::info!("---");

    // Test 2: Non-streaming completion
    log::info!("🧪 Testing a non-streaming completion...");
    let body = json!({
        "model": "mistral.mistral-small-latest",
        "messages": [
            { "role": "user", "content": "Write a haiku about technology" }
        ],
        "max_tokens": 100
    });

    match pipe.pipe(body).await {
        PipeOutput::Text(text) => log::info!("📝 Completion: {}", text),
        PipeOutput::Stream(_) => log::warn!("⚠️  Unexpected stream for a non-streaming request"),
    }

    log::info!("---");

    // Test 3: Streaming completion
    log::info!("🌊 Testing a streaming completion...");
    let body = json!({
        "model": "mistral.mistral-small-latest",
        "messages": [
            { "role": "user", "content": "Tell me a short story about a robot learning to paint" }
        ],
        "max_tokens": 200,
        "temperature": 0.8,
        "stream": true
    });

    match pipe.pipe(body).await {
        PipeOutput::Stream(mut fragments) => {
            log::info!("📺 Streaming response:");

            let mut total_len = 0;
            let mut fragment_count = 0;

            while let Some(fragment) = fragments.next().await {
                print!("{}", fragment);
                total_len += fragment.len();
                fragment_count += 1;
            }
            println!();

            log::info!("🏁 Streaming completed!");
            log::info!("📊 Received {} fragments", fragment_count);
            log::info!("📏 Total response length: {} characters", total_len);
        }
        PipeOutput::Text(text) => log::warn!("⚠️  Expected a stream, got: {}", text),
    }

    log::info!("---");

    // Test 4: Embeddings
    log::info!("🧮 Testing embeddings...");
    let request = EmbeddingRequest::single("The quick brown fox jumps over the lazy dog");

    match pipe.client().embeddings().embed(request).await {
        Ok(response) => {
            log::info!("✅ Embedding generated with {}", response.model);
            if let Some(first) = response.embeddings.first() {
                log::info!("📐 Vector dimension: {}", first.len());
            }
            if let Some(usage) = response.usage {
                log::info!("🔢 Tokens used: {}", usage.total_tokens);
            }
        }
        Err(e) => log::error!("❌ Embedding failed: {}", e),
    }

    log::info!("🎉 Done");
    Ok(())
}
