//! Vector store trait for indexing chunk text and searching it by similarity.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::Chunk;
use crate::error::Result;

/// Distance function a collection ranks neighbors by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// `1 - cosine_similarity`, in `[0, 2]`.
    #[default]
    Cosine,
    /// Euclidean (L2) distance, in `[0, inf)`.
    ///
    /// [`Retriever`](crate::Retriever) scores neighbors as `1 - distance`
    /// clamped to `[0, 1]`, so every neighbor at distance 1 or more scores 0.
    /// Rank order is kept, but scores and thresholds only discriminate among
    /// close neighbors.
    Euclidean,
}

/// One entry to add to a collection: id, text and metadata in lockstep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexRecord {
    /// Id, unique within the collection.
    pub id: String,
    /// The text that is embedded and returned on query.
    pub text: String,
    /// Key-value metadata stored with the entry.
    pub metadata: HashMap<String, String>,
}

impl From<&Chunk> for IndexRecord {
    fn from(chunk: &Chunk) -> Self {
        Self { id: chunk.id(), text: chunk.text.clone(), metadata: chunk.metadata() }
    }
}

/// A stored entry returned by [`VectorStore::query`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Neighbor {
    /// Id of the entry.
    pub id: String,
    /// Stored text of the entry.
    pub text: String,
    /// Stored metadata of the entry.
    pub metadata: HashMap<String, String>,
    /// Distance from the query under the collection's metric (lower is closer).
    pub distance: f32,
}

/// A nearest-neighbor store that owns embedding of both entries and queries.
///
/// Callers hand over plain text; the store computes embeddings when entries
/// are added and when a query runs, so nothing upstream depends on the
/// embedding model.
///
/// # Example
///
/// ```rust,ignore
/// use ragdoc::{DistanceMetric, InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(embedder);
/// store.create_collection("docs", DistanceMetric::Cosine).await?;
/// store.add("docs", &records).await?;
/// let neighbors = store.query("docs", "what is rust?", 3).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create an empty named collection. Replaces any existing collection of
    /// the same name.
    async fn create_collection(&self, name: &str, metric: DistanceMetric) -> Result<()>;

    /// Delete a named collection and all its data. No-op if it does not exist.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Add records to a collection. Ids must be unique, both within the call
    /// and against entries already stored.
    async fn add(&self, collection: &str, records: &[IndexRecord]) -> Result<()>;

    /// Number of entries stored in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Return up to `top_k` entries nearest to `query_text`, ordered by
    /// ascending distance.
    async fn query(&self, collection: &str, query_text: &str, top_k: usize)
    -> Result<Vec<Neighbor>>;
}
