//! Completion service trait and its error type.

use async_trait::async_trait;
use thiserror::Error;

/// Returned in place of an answer when the service succeeds with empty output.
pub const NO_RESPONSE: &str = "No response generated";

/// Why a completion request produced no answer.
///
/// The `Display` form keeps an `Error:` prefix so the message can be shown to
/// a user as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The service answered with a non-success HTTP status.
    #[error("Error: HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for logs.
        body: String,
    },

    /// The request never completed (connection refused, timeout, ...).
    #[error("Error: {0}")]
    Transport(String),

    /// The service answered 2xx but the body could not be understood.
    #[error("Error: malformed response: {0}")]
    Malformed(String),
}

/// A text-completion service.
///
/// # Example
///
/// ```rust,ignore
/// use ragdoc::{Completer, OllamaClient, OllamaConfig};
///
/// let client = OllamaClient::new(OllamaConfig::from_env())?;
/// let answer = client.complete("Why is the sky blue?").await?;
/// ```
#[async_trait]
pub trait Completer: Send + Sync {
    /// Complete `prompt`, returning the generated text.
    ///
    /// A successful but empty completion is returned as [`NO_RESPONSE`].
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Name of the completion model, used in logs and stats.
    fn name(&self) -> &str;
}
