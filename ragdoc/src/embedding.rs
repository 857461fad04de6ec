//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap a specific embedding backend behind a unified async
/// interface. Callers that embed many texts drive concurrency themselves.
///
/// # Example
///
/// ```rust,ignore
/// use ragdoc::{EmbeddingProvider, OllamaClient, OllamaConfig};
///
/// let provider = OllamaClient::new(OllamaConfig::from_env())?;
/// let embedding = provider.embed("hello world").await?;
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Name of the embedding model, used in logs and stats.
    fn name(&self) -> &str;
}
