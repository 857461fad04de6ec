//! Data types for documents, chunks, and answers.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Metadata key holding the chunk's source document identifier.
pub const METADATA_SOURCE: &str = "source";
/// Metadata key holding the chunk's sequence index.
pub const METADATA_CHUNK: &str = "chunk";

/// Raw text extracted from a source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Source identifier, usually the file path.
    pub source: String,
    /// The extracted text.
    pub text: String,
}

impl Document {
    /// Create a document from a source identifier and its text.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), text: text.into() }
    }
}

/// A trimmed, contiguous segment of a [`Document`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Position of the chunk within its document, starting at zero.
    pub index: usize,
    /// The text content of the chunk.
    pub text: String,
    /// The source identifier of the parent [`Document`].
    pub source: String,
}

impl Chunk {
    /// The index entry id for this chunk, `chunk_{index}`.
    pub fn id(&self) -> String {
        format!("chunk_{}", self.index)
    }

    /// Metadata stored alongside the chunk in the index.
    pub fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            (METADATA_SOURCE.to_string(), self.source.clone()),
            (METADATA_CHUNK.to_string(), self.index.to_string()),
        ])
    }
}

/// A retrieved chunk text paired with a relevance score in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk text.
    pub text: String,
    /// Relevance score (higher is more relevant).
    pub score: f32,
}

/// A generated answer and the context that grounded it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The generated text.
    pub text: String,
    /// Chunks used as context, descending by score. Empty when the direct
    /// prompt was used.
    pub context: Vec<ScoredChunk>,
    /// Wall-clock time spent on retrieval and generation.
    pub elapsed: Duration,
}

impl Answer {
    /// Whether the answer was produced from retrieved context.
    pub fn is_grounded(&self) -> bool {
        !self.context.is_empty()
    }
}
