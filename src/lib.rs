//! Mistral adapter pipe: model catalog, chat completions (streaming and
//! not), and embeddings behind a host-facing plugin surface that reports
//! failures as content instead of errors.

pub mod config;
pub mod error;
pub mod logger;
pub mod mistral;
pub mod models;
pub mod pipe;
pub mod retry;
pub mod sse;

pub use config::MistralConfig;
pub use error::{PipeError, Result};
pub use mistral::{CatalogClient, ChatClient, EmbeddingClient, MistralClient};
pub use models::{
    ChatCompletion, ChatMessage, ChatRequest, EmbeddingRequest, EmbeddingResponse,
    GenerationParams, ModelDescriptor, StreamChunk, TokenUsage,
};
pub use pipe::{MistralPipe, Pipe, PipeModel, PipeOutput};
