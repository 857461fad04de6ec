//! # ragdoc
//!
//! Retrieval-augmented question answering over a single PDF.
//!
//! A document is extracted, split into sentence-aligned chunks and indexed in
//! a vector store. Each question retrieves the most relevant chunks and asks a
//! language model to answer from them, falling back to a direct prompt when
//! nothing relevant is found.
//!
//! ## Components
//!
//! - [`PdfTextExtractor`]: per-page PDF text extraction
//! - [`SentenceChunker`]: greedy sentence packing with sentence-level overlap
//! - [`EmbeddingProvider`], [`Completer`], [`VectorStore`]: the three
//!   external services, as traits
//! - [`OllamaClient`]: embeddings, completions and model provisioning over HTTP
//! - [`InMemoryVectorStore`]: cosine nearest-neighbor index
//! - [`Retriever`]: top-K `(text, score)` retrieval that never fails
//! - [`prompt`]: grounded and direct prompt templates
//! - [`RagPipeline`]: ingest and query orchestration
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragdoc::{OllamaClient, OllamaConfig, RagConfig, RagPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ollama = Arc::new(OllamaClient::new(OllamaConfig::from_env())?);
//!     let pipeline = RagPipeline::builder()
//!         .config(RagConfig::default())
//!         .embedding_provider(ollama.clone())
//!         .completer(ollama)
//!         .build()?;
//!
//!     pipeline.ingest_pdf("report.pdf").await?;
//!     let answer = pipeline.query("Who wrote the report?").await?;
//!     println!("{}", answer.text);
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generation;
pub mod inmemory;
pub mod ollama;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod vectorstore;

pub use chunking::{Chunker, SentenceChunker, split_sentences};
pub use config::{DEFAULT_PLACEHOLDER_TEXT, OllamaConfig, RagConfig, RagConfigBuilder};
pub use document::{Answer, Chunk, Document, ScoredChunk};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::{PdfTextExtractor, TextExtractor};
pub use generation::{Completer, GenerationError, NO_RESPONSE};
pub use inmemory::InMemoryVectorStore;
pub use ollama::OllamaClient;
pub use pipeline::{IngestReport, PipelineStats, RagPipeline, RagPipelineBuilder};
pub use retriever::Retriever;
pub use vectorstore::{DistanceMetric, IndexRecord, Neighbor, VectorStore};
