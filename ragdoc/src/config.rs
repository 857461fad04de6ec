//! Configuration for the RAG pipeline and the Ollama inference server.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Text indexed in place of a document that yielded no extractable text.
pub const DEFAULT_PLACEHOLDER_TEXT: &str = "Document submitted - unable to extract text content";

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Maximum number of characters of trailing sentences repeated at the
    /// start of the next chunk.
    pub chunk_overlap: usize,
    /// Number of top results to return from retrieval.
    pub top_k: usize,
    /// Minimum relevance score for results (results below this are filtered out).
    pub similarity_threshold: f32,
    /// Maximum number of embedding requests in flight during ingestion.
    pub embed_concurrency: usize,
    /// Name prefix for index generations.
    pub collection: String,
    /// Text indexed when a document yields no extractable text.
    pub placeholder_text: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
            top_k: 3,
            similarity_threshold: 0.0,
            embed_concurrency: 4,
            collection: "pdf_documents".to_string(),
            placeholder_text: DEFAULT_PLACEHOLDER_TEXT.to_string(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0` or `embed_concurrency == 0`
    /// - `collection` or `placeholder_text` is blank
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.embed_concurrency == 0 {
            return Err(RagError::ConfigError(
                "embed_concurrency must be greater than zero".to_string(),
            ));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::ConfigError("collection must not be empty".to_string()));
        }
        if self.placeholder_text.trim().is_empty() {
            return Err(RagError::ConfigError("placeholder_text must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the target chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results to return from retrieval.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum relevance threshold for filtering results.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set how many embedding requests may run concurrently during ingestion.
    pub fn embed_concurrency(mut self, concurrency: usize) -> Self {
        self.config.embed_concurrency = concurrency;
        self
    }

    /// Set the collection name prefix.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the text indexed for documents with no extractable text.
    pub fn placeholder_text(mut self, text: impl Into<String>) -> Self {
        self.config.placeholder_text = text.into();
        self
    }

    /// Build the [`RagConfig`], checking it with [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Connection settings for an Ollama inference server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OllamaConfig {
    /// Base URL of the server, without the `/api` suffix.
    pub base_url: String,
    /// Model used for text completion.
    pub model: String,
    /// Model used for embeddings.
    pub embed_model: String,
    /// Timeout for a single embedding request.
    pub embed_timeout: Duration,
    /// Timeout for a single completion request.
    pub generate_timeout: Duration,
    /// Timeout for pulling a model.
    pub pull_timeout: Duration,
    /// Timeout for listing models and liveness probes.
    pub probe_timeout: Duration,
    /// Number of liveness probes before giving up.
    pub readiness_retries: u32,
    /// Fixed delay between liveness probes.
    pub readiness_backoff: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "gemma3:1b".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            embed_timeout: Duration::from_secs(60),
            generate_timeout: Duration::from_secs(300),
            pull_timeout: Duration::from_secs(600),
            probe_timeout: Duration::from_secs(5),
            readiness_retries: 30,
            readiness_backoff: Duration::from_secs(2),
        }
    }
}

impl OllamaConfig {
    /// Build a config from `OLLAMA_URL`, `OLLAMA_MODEL` and `OLLAMA_EMBED_MODEL`,
    /// falling back to the defaults for unset or empty variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = non_empty_var("OLLAMA_URL") {
            config.base_url = url;
        }
        if let Some(model) = non_empty_var("OLLAMA_MODEL") {
            config.model = model;
        }
        if let Some(model) = non_empty_var("OLLAMA_EMBED_MODEL") {
            config.embed_model = model;
        }
        config
    }

    /// Set the server base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the completion model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model.
    pub fn with_embed_model(mut self, model: impl Into<String>) -> Self {
        self.embed_model = model.into();
        self
    }

    /// Set the completion timeout.
    pub fn with_generate_timeout(mut self, timeout: Duration) -> Self {
        self.generate_timeout = timeout;
        self
    }

    /// Set the number of liveness probes and the delay between them.
    pub fn with_readiness(mut self, retries: u32, backoff: Duration) -> Self {
        self.readiness_retries = retries;
        self.readiness_backoff = backoff;
        self
    }

    /// Full URL for an API endpoint such as `generate` or `tags`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url.trim_end_matches('/'))
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
