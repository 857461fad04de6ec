//! Prompt templates sent to the completion service.
//!
//! Chunk text and user input are inserted verbatim, with no escaping.

use crate::document::ScoredChunk;

/// Build the prompt for `query`: grounded when `context` is non-empty,
/// direct otherwise.
pub fn build_prompt(query: &str, context: &[ScoredChunk]) -> String {
    if context.is_empty() { direct_prompt(query) } else { grounded_prompt(query, context) }
}

/// A prompt that lists each context chunk as a bullet before the question.
pub fn grounded_prompt(query: &str, context: &[ScoredChunk]) -> String {
    let context = context.iter().map(|c| format!("- {}", c.text)).collect::<Vec<_>>().join("\n");
    format!(
        "Based on the following context from the document, answer the question.\n\n\
         CONTEXT:\n{context}\n\n\
         QUESTION:\n{query}\n\n\
         ANSWER:"
    )
}

/// A plain assistant prompt used when there is no context.
pub fn direct_prompt(message: &str) -> String {
    format!(
        "You are a helpful assistant. Answer the user's message directly.\n\n\
         USER:\n{message}\n\n\
         ASSISTANT:"
    )
}
