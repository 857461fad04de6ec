//! Top-K retrieval over a [`VectorStore`] collection.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::document::ScoredChunk;
use crate::vectorstore::{Neighbor, VectorStore};

/// Turns vector store neighbors into scored chunks.
///
/// Retrieval never fails: a store error or an empty collection yields an
/// empty result, which the pipeline treats as "no context available".
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    similarity_threshold: f32,
}

impl Retriever {
    /// Create a retriever over the given store.
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store, similarity_threshold: 0.0 }
    }

    /// Drop results scoring below `threshold`.
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Return up to `top_k` chunks from `collection` most relevant to
    /// `query`, in non-increasing score order.
    pub async fn retrieve(&self, collection: &str, query: &str, top_k: usize) -> Vec<ScoredChunk> {
        let neighbors = match self.store.query(collection, query, top_k).await {
            Ok(neighbors) => neighbors,
            Err(e) => {
                warn!(collection, error = %e, "retrieval failed, continuing without context");
                return Vec::new();
            }
        };

        let mut results: Vec<ScoredChunk> = neighbors
            .into_iter()
            .map(score)
            .filter(|r| r.score >= self.similarity_threshold)
            .collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        debug!(collection, result_count = results.len(), "retrieved chunks");
        results
    }
}

/// Relevance is `1 - distance`, clamped to `[0, 1]`. Under
/// [`DistanceMetric::Euclidean`](crate::DistanceMetric::Euclidean) all
/// neighbors at distance 1 or more tie at 0; the sort is stable, so they stay
/// in store order.
fn score(neighbor: Neighbor) -> ScoredChunk {
    let score = (1.0 - neighbor.distance).clamp(0.0, 1.0);
    ScoredChunk { text: neighbor.text, score }
}
