//! Fakes for the capability traits, shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ragdoc::{Completer, EmbeddingProvider, GenerationError, RagError};

/// Bag-of-words embedder: each lowercase alphanumeric token bumps one of
/// `dims` buckets. Texts sharing words end up close under cosine distance.
pub struct BagOfWordsEmbedder {
    dims: usize,
    calls: AtomicUsize,
}

impl BagOfWordsEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> ragdoc::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut v = vec![0.0f32; self.dims];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
        {
            let hash =
                token.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            v[(hash % self.dims as u64) as usize] += 1.0;
        }
        Ok(v)
    }

    fn name(&self) -> &str {
        "bag-of-words"
    }
}

/// Embedder backed by a fixed text → vector table. Unknown texts fail.
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub fn new(entries: impl IntoIterator<Item = (String, Vec<f32>)>) -> Self {
        Self { table: entries.into_iter().collect() }
    }
}

#[async_trait]
impl EmbeddingProvider for TableEmbedder {
    async fn embed(&self, text: &str) -> ragdoc::Result<Vec<f32>> {
        self.table.get(text).cloned().ok_or_else(|| RagError::EmbeddingError {
            provider: "table".into(),
            message: format!("no embedding for '{text}'"),
        })
    }

    fn name(&self) -> &str {
        "table"
    }
}

/// Completer that records prompts and replies with a fixed outcome.
pub struct ScriptedCompleter {
    reply: Result<String, GenerationError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompleter {
    pub fn answering(text: &str) -> Self {
        Self { reply: Ok(text.to_string()), prompts: Mutex::new(Vec::new()) }
    }

    pub fn failing(error: GenerationError) -> Self {
        Self { reply: Err(error), prompts: Mutex::new(Vec::new()) }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
