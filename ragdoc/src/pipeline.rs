//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] owns the live index generation and coordinates the two
//! flows:
//!
//! - **ingest**: extract → chunk → create collection → add, then swap the new
//!   generation in and drop the previous one
//! - **query**: retrieve → build prompt (grounded or direct) → complete
//!
//! # Example
//!
//! ```rust,ignore
//! use ragdoc::{OllamaClient, OllamaConfig, RagConfig, RagPipeline};
//!
//! let ollama = Arc::new(OllamaClient::new(OllamaConfig::from_env())?);
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(ollama.clone())
//!     .completer(ollama)
//!     .build()?;
//!
//! pipeline.ingest_pdf("report.pdf").await?;
//! let answer = pipeline.query("What is the total revenue?").await?;
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::chunking::{Chunker, SentenceChunker};
use crate::config::RagConfig;
use crate::document::{Answer, Chunk, Document};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::{PdfTextExtractor, TextExtractor};
use crate::generation::{Completer, NO_RESPONSE};
use crate::inmemory::InMemoryVectorStore;
use crate::prompt;
use crate::retriever::Retriever;
use crate::vectorstore::{DistanceMetric, IndexRecord, VectorStore};

/// The collection currently answering queries.
#[derive(Debug, Clone)]
struct IndexGeneration {
    collection: String,
    source: String,
    chunk_count: usize,
    ingested_at: DateTime<Utc>,
}

/// Outcome of a successful ingest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestReport {
    /// Source identifier of the ingested document.
    pub source: String,
    /// Number of chunks written to the index.
    pub chunks_indexed: usize,
    /// Whether the placeholder text was indexed because the document was empty.
    pub used_placeholder: bool,
    /// Name of the collection now answering queries.
    pub collection: String,
}

/// A snapshot of the pipeline's models and live index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineStats {
    /// Completion model name.
    pub model: String,
    /// Embedding model name, when the pipeline was built from a provider.
    pub embedder: Option<String>,
    /// Live collection, if a document has been ingested.
    pub collection: Option<String>,
    /// Source of the live collection.
    pub source: Option<String>,
    /// Number of chunks in the live collection.
    pub chunk_count: usize,
    /// When the live collection was swapped in.
    pub ingested_at: Option<DateTime<Utc>>,
}

/// The RAG pipeline orchestrator.
///
/// Each pipeline is an independent context: it owns one live index
/// generation, and several pipelines may share a vector store without seeing
/// each other's data. Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    vector_store: Arc<dyn VectorStore>,
    completer: Arc<dyn Completer>,
    chunker: Arc<dyn Chunker>,
    extractor: Arc<dyn TextExtractor>,
    retriever: Retriever,
    embedder_name: Option<String>,
    active: RwLock<Option<IndexGeneration>>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Ingest a PDF file, replacing any previously ingested document.
    ///
    /// A PDF that cannot be read or has no text is indexed as a single
    /// placeholder chunk rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DocumentNotFound`] if `path` does not exist, and
    /// [`RagError::PipelineError`] if indexing fails. On error the previously
    /// ingested document stays live.
    pub async fn ingest_pdf(&self, path: impl AsRef<Path>) -> Result<IngestReport> {
        let path = path.as_ref().to_path_buf();
        let source = path.display().to_string();
        if !path.exists() {
            return Err(RagError::DocumentNotFound { path: source });
        }

        info!(source = %source, "extracting text");
        let extractor = self.extractor.clone();
        let extracted = tokio::task::spawn_blocking(move || extractor.extract(&path)).await;
        let text = match extracted {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(source = %source, error = %e, "extraction failed");
                String::new()
            }
            Err(e) => {
                warn!(source = %source, error = %e, "extraction task failed");
                String::new()
            }
        };

        self.ingest_document(Document::new(source, text)).await
    }

    /// Ingest already-extracted text under the given source identifier,
    /// replacing any previously ingested document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if indexing fails.
    pub async fn ingest_text(
        &self,
        source: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<IngestReport> {
        self.ingest_document(Document::new(source, text)).await
    }

    async fn ingest_document(&self, document: Document) -> Result<IngestReport> {
        let mut chunks = if document.text.trim().is_empty() {
            warn!(source = %document.source, "document has no extractable text");
            Vec::new()
        } else {
            info!(source = %document.source, chars = document.text.len(), "chunking text");
            self.chunker.chunk(&document)
        };
        let used_placeholder = chunks.is_empty();
        if used_placeholder {
            info!(source = %document.source, "indexing placeholder chunk");
            chunks.push(Chunk {
                index: 0,
                text: self.config.placeholder_text.clone(),
                source: document.source.clone(),
            });
        }

        let collection = format!("{}_{}", self.config.collection, Uuid::new_v4().simple());
        self.vector_store.create_collection(&collection, DistanceMetric::Cosine).await.map_err(
            |e| {
                error!(collection = %collection, error = %e, "failed to create collection");
                RagError::PipelineError(format!("failed to create collection '{collection}': {e}"))
            },
        )?;

        let records: Vec<IndexRecord> = chunks.iter().map(IndexRecord::from).collect();
        if let Err(e) = self.vector_store.add(&collection, &records).await {
            error!(source = %document.source, error = %e, "adding chunks failed during ingestion");
            self.drop_collection(&collection).await;
            return Err(RagError::PipelineError(format!(
                "failed to index document '{}': {e}",
                document.source
            )));
        }

        let generation = IndexGeneration {
            collection: collection.clone(),
            source: document.source.clone(),
            chunk_count: records.len(),
            ingested_at: Utc::now(),
        };
        let previous = self.active.write().await.replace(generation);
        if let Some(previous) = previous {
            self.drop_collection(&previous.collection).await;
        }

        info!(
            source = %document.source,
            chunk_count = records.len(),
            collection = %collection,
            "ingested document"
        );

        Ok(IngestReport {
            source: document.source,
            chunks_indexed: records.len(),
            used_placeholder,
            collection,
        })
    }

    async fn drop_collection(&self, collection: &str) {
        if let Err(e) = self.vector_store.delete_collection(collection).await {
            warn!(collection, error = %e, "failed to delete collection");
        }
    }

    /// Answer `question` from the ingested document.
    ///
    /// Retrieves the `top_k` most relevant chunks and asks the completer to
    /// answer from them. If nothing is retrieved (no document ingested, an
    /// unreachable index, or no chunk above the threshold), the question is
    /// asked directly without context. A blank completion is returned as
    /// [`NO_RESPONSE`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidInput`] for a blank question and
    /// [`RagError::Generation`] if the completer fails.
    pub async fn query(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidInput("question must not be empty".to_string()));
        }

        let started = Instant::now();
        let context = {
            let active = self.active.read().await;
            match active.as_ref() {
                Some(generation) => {
                    self.retriever
                        .retrieve(&generation.collection, question, self.config.top_k)
                        .await
                }
                None => {
                    debug!("no document ingested, answering without context");
                    Vec::new()
                }
            }
        };

        if context.is_empty() {
            info!("no relevant chunks found, using direct prompt");
        } else {
            info!(chunk_count = context.len(), "retrieved relevant chunks");
        }

        let prompt = prompt::build_prompt(question, &context);
        let text = self.complete(&prompt).await?;

        let elapsed = started.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "query completed");
        Ok(Answer { text, context, elapsed })
    }

    /// Answer `message` directly, without retrieval.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidInput`] for a blank message and
    /// [`RagError::Generation`] if the completer fails.
    pub async fn chat(&self, message: &str) -> Result<Answer> {
        let message = message.trim();
        if message.is_empty() {
            return Err(RagError::InvalidInput("message must not be empty".to_string()));
        }

        let started = Instant::now();
        let text = self.complete(&prompt::direct_prompt(message)).await?;
        Ok(Answer { text, context: Vec::new(), elapsed: started.elapsed() })
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let text = self.completer.complete(prompt).await.map_err(|e| {
            error!(model = self.completer.name(), error = %e, "generation failed");
            RagError::Generation(e)
        })?;
        if text.trim().is_empty() {
            warn!(model = self.completer.name(), "completion was empty");
            return Ok(NO_RESPONSE.to_string());
        }
        Ok(text)
    }

    /// Report the models in use and the live index generation.
    pub async fn stats(&self) -> PipelineStats {
        let active = self.active.read().await;
        PipelineStats {
            model: self.completer.name().to_string(),
            embedder: self.embedder_name.clone(),
            collection: active.as_ref().map(|g| g.collection.clone()),
            source: active.as_ref().map(|g| g.source.clone()),
            chunk_count: active.as_ref().map_or(0, |g| g.chunk_count),
            ingested_at: active.as_ref().map(|g| g.ingested_at),
        }
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config` and `completer` are required, plus either a `vector_store` or an
/// `embedding_provider` (from which an [`InMemoryVectorStore`] is built).
/// The chunker defaults to a [`SentenceChunker`] sized from the config and
/// the extractor to [`PdfTextExtractor`].
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .completer(Arc::new(completer))
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    completer: Option<Arc<dyn Completer>>,
    chunker: Option<Arc<dyn Chunker>>,
    extractor: Option<Arc<dyn TextExtractor>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider used to build the default in-memory store.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend. Takes precedence over
    /// [`embedding_provider`](Self::embedding_provider).
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the completion service.
    pub fn completer(mut self, completer: Arc<dyn Completer>) -> Self {
        self.completer = Some(completer);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the text extractor used by [`RagPipeline::ingest_pdf`].
    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing or
    /// the config fails [`RagConfig::validate`].
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        config.validate()?;
        let completer = self
            .completer
            .ok_or_else(|| RagError::ConfigError("completer is required".to_string()))?;
        let embedder_name = self.embedding_provider.as_ref().map(|p| p.name().to_string());
        let vector_store: Arc<dyn VectorStore> = match (self.vector_store, self.embedding_provider)
        {
            (Some(store), _) => store,
            (None, Some(provider)) => Arc::new(
                InMemoryVectorStore::new(provider).with_concurrency(config.embed_concurrency),
            ),
            (None, None) => {
                return Err(RagError::ConfigError(
                    "vector_store or embedding_provider is required".to_string(),
                ));
            }
        };
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(SentenceChunker::new(config.chunk_size, config.chunk_overlap))
        });
        let extractor = self.extractor.unwrap_or_else(|| Arc::new(PdfTextExtractor));
        let retriever = Retriever::new(vector_store.clone())
            .with_similarity_threshold(config.similarity_threshold);

        Ok(RagPipeline {
            config,
            vector_store,
            completer,
            chunker,
            extractor,
            retriever,
            embedder_name,
            active: RwLock::new(None),
        })
    }
}
