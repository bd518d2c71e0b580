use futures::StreamExt;
use mistral_pipe::{ChatMessage, ChatRequest, GenerationParams, MistralClient, MistralConfig};
use std::env;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded"),
        Err(_) => log::warn!("⚠️  No .env file found"),
    }
    mistral_pipe::logger::init()?;

    let api_key = env::var("MISTRAL_API_KEY")?;
    let config = MistralConfig::new().with_api_key(api_key);

    let client = MistralClient::new(config)?;
    let request = ChatRequest::new(
        "mistral-small-latest",
        vec![
            ChatMessage::system("You are a terse assistant."),
            ChatMessage::user("Explain what an embedding is in two sentences."),
        ],
    )
    .with_params(GenerationParams {
        max_tokens: Some(200),
        ..GenerationParams::default()
    });

    let response = client.chat().complete(&request).await?;
    println!("{}", response.content);
    println!("---");

    let request = ChatRequest::new(
        "mistral-small-latest",
        vec![ChatMessage::user("Now stream a two-line poem about them.")],
    );

    let mut fragments = client.chat().stream(&request).await?;
    while let Some(chunk) = fragments.next().await {
        let chunk = chunk?;
        if chunk.done {
            break;
        }
        print!("{}", chunk.text);
        std::io::stdout().flush()?;
    }
    println!();

    Ok(())
}
