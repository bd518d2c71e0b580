use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;

/// Lazy sequence of rendered text fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// One entry of the model menu shown by the host.
#[derive(Debug, Clone, Serialize)]
pub struct PipeModel {
    pub id: String,
    pub name: String,
}

/// What a dispatched request renders to: the whole reply at once, or
/// fragments as the vendor emits them.
pub enum PipeOutput {
    Text(String),
    Stream(TextStream),
}

impl PipeOutput {
    /// Drains the output into one string, whichever shape it arrived in.
    pub async fn collect_text(self) -> String {
        match self {
            PipeOutput::Text(text) => text,
            PipeOutput::Stream(mut fragments) => {
                let mut collected = String::new();
                while let Some(fragment) = fragments.next().await {
                    collected.push_str(&fragment);
                }
                collected
            }
        }
    }
}

impl fmt::Debug for PipeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipeOutput::Text(text) => f.debug_tuple("Text").field(text).finish(),
            PipeOutput::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Host-facing adapter surface. A pipe never leaks errors across this
/// boundary: failures render as ordinary content and an unavailable
/// catalog renders as an empty menu.
#[async_trait]
pub trait Pipe: Send + Sync {
    /// Surface kind advertised to the host; "manifold" means one pipe
    /// fronting many models.
    fn kind(&self) -> &str;

    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Curated model menu.
    async fn pipes(&self) -> Vec<PipeModel>;

    /// Runs one request body and renders the reply.
    async fn pipe(&self, body: Value) -> PipeOutput;
}
