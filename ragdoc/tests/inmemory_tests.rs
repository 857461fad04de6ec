//! Tests for the in-memory vector store.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{BagOfWordsEmbedder, TableEmbedder};
use proptest::prelude::*;
use ragdoc::{
    DistanceMetric, EmbeddingProvider, InMemoryVectorStore, IndexRecord, RagError, VectorStore,
};

fn record(id: &str, text: &str) -> IndexRecord {
    IndexRecord {
        id: id.to_string(),
        text: text.to_string(),
        metadata: HashMap::from([("source".to_string(), "test".to_string())]),
    }
}

fn table(entries: &[(&str, Vec<f32>)]) -> Arc<TableEmbedder> {
    Arc::new(TableEmbedder::new(entries.iter().map(|(t, v)| (t.to_string(), v.clone()))))
}

#[tokio::test]
async fn query_returns_nearest_first_with_cosine_distance() {
    let embedder = table(&[
        ("north", vec![0.0, 1.0]),
        ("east", vec![1.0, 0.0]),
        ("north-east", vec![1.0, 1.0]),
        ("south", vec![0.0, -1.0]),
    ]);
    let store = InMemoryVectorStore::new(embedder);
    store.create_collection("docs", DistanceMetric::Cosine).await.unwrap();
    store
        .add("docs", &[record("a", "east"), record("b", "north-east"), record("c", "south")])
        .await
        .unwrap();

    let neighbors = store.query("docs", "north", 3).await.unwrap();
    let ids: Vec<&str> = neighbors.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert!((neighbors[1].distance - 1.0).abs() < 1e-6);
    assert!((neighbors[2].distance - 2.0).abs() < 1e-6);
    assert_eq!(neighbors[0].text, "north-east");
    assert_eq!(neighbors[0].metadata.get("source").map(String::as_str), Some("test"));
}

#[tokio::test]
async fn euclidean_collections_rank_by_l2_distance() {
    let embedder = table(&[("q", vec![0.0, 0.0]), ("near", vec![1.0, 0.0]), ("far", vec![3.0, 4.0])]);
    let store = InMemoryVectorStore::new(embedder);
    store.create_collection("docs", DistanceMetric::Euclidean).await.unwrap();
    store.add("docs", &[record("far", "far"), record("near", "near")]).await.unwrap();

    let neighbors = store.query("docs", "q", 5).await.unwrap();
    assert_eq!(neighbors.len(), 2);
    assert_eq!(neighbors[0].id, "near");
    assert!((neighbors[1].distance - 5.0).abs() < 1e-6);
}

#[tokio::test]
async fn empty_collection_returns_nothing_without_embedding() {
    let embedder = Arc::new(BagOfWordsEmbedder::new(16));
    let store = InMemoryVectorStore::new(embedder.clone());
    store.create_collection("docs", DistanceMetric::Cosine).await.unwrap();

    let neighbors = store.query("docs", "anything", 3).await.unwrap();
    assert!(neighbors.is_empty());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn missing_collection_is_an_error() {
    let store = InMemoryVectorStore::new(Arc::new(BagOfWordsEmbedder::new(16)));
    let err = store.query("nope", "anything", 3).await.unwrap_err();
    assert!(matches!(err, RagError::VectorStoreError { .. }));
    assert!(store.add("nope", &[record("a", "x")]).await.is_err());
}

#[tokio::test]
async fn duplicate_ids_are_rejected() {
    let store = InMemoryVectorStore::new(Arc::new(BagOfWordsEmbedder::new(16)));
    store.create_collection("docs", DistanceMetric::Cosine).await.unwrap();

    let err = store.add("docs", &[record("a", "one"), record("a", "two")]).await.unwrap_err();
    assert!(err.to_string().contains("duplicate id 'a'"));
    assert_eq!(store.count("docs").await.unwrap(), 0);

    store.add("docs", &[record("a", "one")]).await.unwrap();
    assert!(store.add("docs", &[record("a", "again")]).await.is_err());
    assert_eq!(store.count("docs").await.unwrap(), 1);
}

#[tokio::test]
async fn entries_without_embeddings_are_stored_but_never_returned() {
    // "unknown" has no table entry, so embedding it fails.
    let embedder = table(&[("known", vec![1.0, 0.0]), ("q", vec![1.0, 0.0])]);
    let store = InMemoryVectorStore::new(embedder).with_concurrency(4);
    store.create_collection("docs", DistanceMetric::Cosine).await.unwrap();
    store.add("docs", &[record("a", "unknown"), record("b", "known")]).await.unwrap();

    assert_eq!(store.count("docs").await.unwrap(), 2);
    let neighbors = store.query("docs", "q", 5).await.unwrap();
    assert_eq!(neighbors.len(), 1);
    assert_eq!(neighbors[0].id, "b");
}

#[tokio::test]
async fn recreating_a_collection_clears_it() {
    let store = InMemoryVectorStore::new(Arc::new(BagOfWordsEmbedder::new(16)));
    store.create_collection("docs", DistanceMetric::Cosine).await.unwrap();
    store.add("docs", &[record("a", "one")]).await.unwrap();
    store.create_collection("docs", DistanceMetric::Cosine).await.unwrap();
    assert_eq!(store.count("docs").await.unwrap(), 0);

    store.delete_collection("docs").await.unwrap();
    assert!(store.count("docs").await.is_err());
    // Deleting twice is fine.
    store.delete_collection("docs").await.unwrap();
}

/// Embedder that sleeps before answering queries for "slow".
struct SlowQueryEmbedder;

#[async_trait]
impl EmbeddingProvider for SlowQueryEmbedder {
    async fn embed(&self, text: &str) -> ragdoc::Result<Vec<f32>> {
        if text == "slow" {
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        Ok(vec![1.0, 0.0])
    }

    fn name(&self) -> &str {
        "slow"
    }
}

#[tokio::test]
async fn embedding_a_query_does_not_block_writers() {
    let store = Arc::new(InMemoryVectorStore::new(Arc::new(SlowQueryEmbedder)));
    store.create_collection("a", DistanceMetric::Cosine).await.unwrap();
    store.add("a", &[record("x", "fast")]).await.unwrap();

    let querying = {
        let store = store.clone();
        tokio::spawn(async move { store.query("a", "slow", 1).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    tokio::time::timeout(Duration::from_millis(200), async {
        store.create_collection("b", DistanceMetric::Cosine).await.unwrap();
        store.add("b", &[record("y", "fast")]).await.unwrap();
    })
    .await
    .expect("writers waited for the query embedding");

    let neighbors = querying.await.unwrap().unwrap();
    assert_eq!(neighbors.len(), 1);
    assert_eq!(neighbors[0].id, "x");
}

#[tokio::test]
async fn concurrent_add_keeps_record_order_and_runs_on_spawned_tasks() {
    let embedder = Arc::new(BagOfWordsEmbedder::new(64));
    let store = Arc::new(InMemoryVectorStore::new(embedder.clone()).with_concurrency(3));
    store.create_collection("docs", DistanceMetric::Cosine).await.unwrap();

    let records: Vec<IndexRecord> = (0..10)
        .map(|i| record(&format!("chunk_{i}"), &format!("word{i} shared")))
        .collect();
    let adding = {
        let store = store.clone();
        tokio::spawn(async move { store.add("docs", &records).await })
    };
    adding.await.unwrap().unwrap();

    assert_eq!(store.count("docs").await.unwrap(), 10);
    assert_eq!(embedder.calls(), 10);
    let neighbors = store.query("docs", "word7", 1).await.unwrap();
    assert_eq!(neighbors[0].id, "chunk_7");
    assert_eq!(neighbors[0].text, "word7 shared");
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-3 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// For any set of stored entries, a query returns at most `top_k` neighbors
/// in ascending distance order, with cosine distances inside `[0, 2]`.
mod prop_inmemory_query_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn neighbors_ordered_ascending_and_bounded_by_top_k(
            embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let neighbors = rt.block_on(async {
                let mut entries: Vec<(String, Vec<f32>)> = embeddings
                    .iter()
                    .enumerate()
                    .map(|(i, e)| (format!("text {i}"), e.clone()))
                    .collect();
                entries.push(("query".to_string(), query.clone()));
                let store = InMemoryVectorStore::new(Arc::new(TableEmbedder::new(entries)));
                store.create_collection("test", DistanceMetric::Cosine).await.unwrap();

                let records: Vec<IndexRecord> = (0..embeddings.len())
                    .map(|i| record(&format!("chunk_{i}"), &format!("text {i}")))
                    .collect();
                store.add("test", &records).await.unwrap();
                store.query("test", "query", top_k).await.unwrap()
            });

            prop_assert!(neighbors.len() <= top_k);
            prop_assert_eq!(neighbors.len(), top_k.min(embeddings.len()));

            for n in &neighbors {
                prop_assert!((-1e-5..=2.0 + 1e-5).contains(&n.distance));
            }
            for window in neighbors.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "neighbors not in ascending order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }
        }
    }
}
