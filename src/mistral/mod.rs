pub mod catalog_client;
pub mod chat_client;
pub mod embedding_client;

use std::time::Duration;

use crate::{
    config::MistralConfig,
    error::{PipeError, Result},
};

pub use catalog_client::CatalogClient;
pub use chat_client::ChatClient;
pub use embedding_client::EmbeddingClient;

/// Entry point to the vendor API. One HTTP connection pool is shared by the
/// per-concern clients.
#[derive(Clone)]
pub struct MistralClient {
    catalog_client: CatalogClient,
    chat_client: ChatClient,
    embedding_client: EmbeddingClient,
}

impl MistralClient {
    pub fn new(config: MistralConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            catalog_client: CatalogClient::new(http.clone(), config.clone()),
            chat_client: ChatClient::new(http.clone(), config.clone()),
            embedding_client: EmbeddingClient::new(http, config),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(MistralConfig::from_env())
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog_client
    }

    pub fn chat(&self) -> &ChatClient {
        &self.chat_client
    }

    pub fn embeddings(&self) -> &EmbeddingClient {
        &self.embedding_client
    }
}

/// Maps a non-success response onto the error taxonomy. Consumes the body
/// so the message carries whatever detail the server offered.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => PipeError::Auth(format!(
            "{} rejected credentials ({}): {}",
            endpoint, status, body
        )),
        429 => PipeError::RateLimited(format!("{} rate limited: {}", endpoint, body)),
        _ => PipeError::Network(format!("{} returned {}: {}", endpoint, status, body)),
    })
}
