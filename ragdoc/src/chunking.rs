//! Sentence-boundary chunking.
//!
//! This module provides the [`Chunker`] trait and [`SentenceChunker`], which
//! greedily packs whole sentences into chunks bounded by a target size.
//! Sentences are never split, so a single sentence longer than the target
//! becomes its own oversized chunk.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Chunk, Document};

/// Sentence-ending punctuation followed by whitespace.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern is valid"));

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no non-whitespace text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Packs sentences into chunks of at most `chunk_size` characters.
///
/// Sentences are accumulated into a buffer (each followed by one space). When
/// appending the next sentence would make the buffer reach `chunk_size`, the
/// buffer is closed as a trimmed chunk and a new one is started.
///
/// The new buffer is seeded with the trailing sentences of the previous chunk
/// that fit within `chunk_overlap` characters, as long as the seeded buffer
/// still stays under `chunk_size`. With `chunk_overlap == 0` consecutive chunks
/// share nothing.
///
/// # Example
///
/// ```rust,ignore
/// use ragdoc::{Document, SentenceChunker, Chunker};
///
/// let chunker = SentenceChunker::new(500, 100);
/// let chunks = chunker.chunk(&Document::new("report.pdf", text));
/// ```
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SentenceChunker {
    /// Create a new `SentenceChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: target maximum number of characters per chunk
    /// * `chunk_overlap`: maximum characters of trailing sentences repeated in the next chunk
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Split raw text into trimmed chunk strings, in document order.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut buffer = SentenceBuffer::default();

        for sentence in split_sentences(text) {
            let sentence_len = char_len(sentence);
            if buffer.len + sentence_len < self.chunk_size {
                buffer.push(sentence);
                continue;
            }

            let closed = buffer.text();
            if !closed.is_empty() {
                chunks.push(closed);
            }

            let mut next = buffer.tail(self.chunk_overlap);
            if next.len + sentence_len >= self.chunk_size {
                next = SentenceBuffer::default();
            }
            next.push(sentence);
            buffer = next;
        }

        let rest = buffer.text();
        if !rest.is_empty() {
            chunks.push(rest);
        }

        chunks
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        self.split_text(&document.text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk { index, text, source: document.source.clone() })
            .collect()
    }
}

/// Sentences accumulated for the chunk being built. `len` counts each
/// sentence plus its trailing space, in characters.
#[derive(Debug, Default)]
struct SentenceBuffer<'a> {
    sentences: Vec<&'a str>,
    len: usize,
}

impl<'a> SentenceBuffer<'a> {
    fn push(&mut self, sentence: &'a str) {
        self.len += char_len(sentence) + 1;
        self.sentences.push(sentence);
    }

    fn text(&self) -> String {
        self.sentences.join(" ").trim().to_string()
    }

    /// The longest run of trailing sentences whose buffered length fits in `budget`.
    fn tail(&self, budget: usize) -> SentenceBuffer<'a> {
        let mut len = 0;
        let mut start = self.sentences.len();
        for (i, sentence) in self.sentences.iter().enumerate().rev() {
            let next = len + char_len(sentence) + 1;
            if next > budget {
                break;
            }
            len = next;
            start = i;
        }
        SentenceBuffer { sentences: self.sentences[start..].to_vec(), len }
    }
}

/// Split text at sentence-ending punctuation followed by whitespace.
///
/// The punctuation stays with its sentence and the whitespace run is dropped.
/// Empty segments are skipped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // The punctuation mark is a single ASCII byte.
        let end = boundary.start() + 1;
        sentences.push(&text[start..end]);
        start = boundary.end();
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences.retain(|s| !s.is_empty());
    sentences
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
