//! Error types for the `ragdoc` crate.

use thiserror::Error;

use crate::generation::GenerationError;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Text could not be pulled out of a source document.
    #[error("Extraction error ({path}): {message}")]
    ExtractionError {
        /// The document path.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// The completion service failed to produce an answer.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The caller supplied input that is rejected before any external call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The document to ingest does not exist.
    #[error("Document not found: {path}")]
    DocumentNotFound {
        /// The missing path.
        path: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the RAG pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
