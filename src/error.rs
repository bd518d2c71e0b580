use thiserror::Error;

/// Failure taxonomy for the adapter.
///
/// Every variant renders as a plain sentence because the pipe boundary
/// surfaces failures to the host as ordinary message content.
#[derive(Debug, Error)]
pub enum PipeError {
    /// Missing or empty API key. Raised before any network I/O.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The vendor rejected the bearer token (HTTP 401/403).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Transport failure or a non-success status other than 429.
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 429. The only retryable failure.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The vendor answered 2xx but the body was not what we expected.
    #[error("Response error: {0}")]
    Response(String),

    /// A required field was absent from a pipe request body.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Payload (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PipeError {
    /// Whether the bounded backoff loop may try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipeError::RateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, PipeError>;
