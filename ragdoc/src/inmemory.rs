//! In-memory vector store.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by a
//! `HashMap` protected by a `tokio::sync::RwLock`. It embeds entries and
//! queries through an injected [`EmbeddingProvider`]. Nothing is persisted.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::{DistanceMetric, IndexRecord, Neighbor, VectorStore};

const BACKEND: &str = "InMemory";

/// A stored record and its embedding. `None` means embedding failed and the
/// entry can never match a query.
#[derive(Debug, Clone)]
struct Entry {
    record: IndexRecord,
    embedding: Option<Vec<f32>>,
}

#[derive(Debug, Default)]
struct Collection {
    metric: DistanceMetric,
    entries: Vec<Entry>,
    ids: HashSet<String>,
}

/// An in-memory [`VectorStore`] that computes embeddings itself.
///
/// Collections are stored as a `HashMap` of collection name → entries in
/// insertion order. Entries are embedded with up to `concurrency` requests in
/// flight; results keep the order of the input records.
///
/// # Example
///
/// ```rust,ignore
/// use ragdoc::{DistanceMetric, InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(Arc::new(embedder)).with_concurrency(8);
/// store.create_collection("docs", DistanceMetric::Cosine).await?;
/// ```
pub struct InMemoryVectorStore {
    embedder: Arc<dyn EmbeddingProvider>,
    concurrency: usize,
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create an empty store that embeds with the given provider.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder, concurrency: 1, collections: RwLock::new(HashMap::new()) }
    }

    /// Set how many embedding requests may run at once while adding records.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Embed every record, keeping input order. Failures become `None`.
    async fn embed_records(&self, records: &[IndexRecord]) -> Vec<Option<Vec<f32>>> {
        let pending: Vec<_> = records
            .iter()
            .map(|record| embed_one(self.embedder.clone(), record.id.clone(), record.text.clone()))
            .collect();
        stream::iter(pending).buffered(self.concurrency).collect().await
    }
}

async fn embed_one(
    embedder: Arc<dyn EmbeddingProvider>,
    id: String,
    text: String,
) -> Option<Vec<f32>> {
    match embedder.embed(&text).await {
        Ok(embedding) => Some(embedding),
        Err(e) => {
            warn!(id = %id, error = %e, "no embedding available, entry will not be searchable");
            None
        }
    }
}

fn missing_collection(name: &str) -> RagError {
    RagError::VectorStoreError {
        backend: BACKEND.to_string(),
        message: format!("collection '{name}' does not exist"),
    }
}

/// Compute cosine distance (`1 - cosine similarity`) between two vectors.
///
/// Returns 1.0 (orthogonal) if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

impl DistanceMetric {
    fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Euclidean => euclidean_distance(a, b),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, metric: DistanceMetric) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.insert(name.to_string(), Collection { metric, ..Collection::default() });
        debug!(collection = name, ?metric, "created collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn add(&self, collection: &str, records: &[IndexRecord]) -> Result<()> {
        {
            let collections = self.collections.read().await;
            let store = collections.get(collection).ok_or_else(|| missing_collection(collection))?;
            let mut seen = HashSet::with_capacity(records.len());
            for record in records {
                if store.ids.contains(&record.id) || !seen.insert(record.id.as_str()) {
                    return Err(RagError::VectorStoreError {
                        backend: BACKEND.to_string(),
                        message: format!(
                            "duplicate id '{}' in collection '{collection}'",
                            record.id
                        ),
                    });
                }
            }
        }

        let embeddings = self.embed_records(records).await;

        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing_collection(collection))?;
        // The lock was released while embedding; another writer may have raced us.
        if let Some(record) = records.iter().find(|r| store.ids.contains(&r.id)) {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!("duplicate id '{}' in collection '{collection}'", record.id),
            });
        }
        for (record, embedding) in records.iter().zip(embeddings) {
            store.ids.insert(record.id.clone());
            store.entries.push(Entry { record: record.clone(), embedding });
        }
        debug!(collection, added = records.len(), total = store.entries.len(), "added records");
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing_collection(collection))?;
        Ok(store.entries.len())
    }

    async fn query(
        &self,
        collection: &str,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<Neighbor>> {
        {
            let collections = self.collections.read().await;
            let store =
                collections.get(collection).ok_or_else(|| missing_collection(collection))?;
            if store.entries.is_empty() || top_k == 0 {
                return Ok(Vec::new());
            }
        }

        // The lock is not held while the query is embedded.
        let query_embedding = self.embedder.embed(query_text).await?;

        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing_collection(collection))?;

        let mut neighbors: Vec<Neighbor> = store
            .entries
            .iter()
            .filter_map(|entry| {
                let embedding = entry.embedding.as_ref()?;
                if embedding.len() != query_embedding.len() {
                    warn!(id = %entry.record.id, "embedding dimension mismatch, skipping entry");
                    return None;
                }
                Some(Neighbor {
                    id: entry.record.id.clone(),
                    text: entry.record.text.clone(),
                    metadata: entry.record.metadata.clone(),
                    distance: store.metric.distance(embedding, &query_embedding),
                })
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(top_k);
        Ok(neighbors)
    }
}
