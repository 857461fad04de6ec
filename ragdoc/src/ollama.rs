//! Ollama client for embeddings, completions and model provisioning.
//!
//! Uses `reqwest` to call the Ollama REST API directly:
//!
//! | Call | Endpoint |
//! |------|----------|
//! | embed | `POST /api/embed {model, input}` |
//! | complete | `POST /api/generate {model, prompt, stream: false}` |
//! | list models / liveness | `GET /api/tags` |
//! | pull | `POST /api/pull {model, stream: false}` |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::OllamaConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{Completer, GenerationError, NO_RESPONSE};

const PROVIDER: &str = "Ollama";

/// A client for one Ollama server, serving both as [`EmbeddingProvider`]
/// (with `embed_model`) and [`Completer`] (with `model`).
///
/// Every request carries its own timeout from [`OllamaConfig`]; a timeout is
/// reported like any other transport failure.
///
/// # Example
///
/// ```rust,ignore
/// use ragdoc::{OllamaClient, OllamaConfig};
///
/// let client = OllamaClient::new(OllamaConfig::from_env())?;
/// if client.wait_until_ready().await {
///     client.ensure_models().await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a client for the server described by `config`.
    pub fn new(config: OllamaConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(RagError::ConfigError("Ollama base_url must not be empty".into()));
        }
        if config.model.trim().is_empty() || config.embed_model.trim().is_empty() {
            return Err(RagError::ConfigError("Ollama model names must not be empty".into()));
        }
        Ok(Self { client: reqwest::Client::new(), config })
    }

    /// Return the client configuration.
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Probe `GET /api/tags` once.
    pub async fn is_ready(&self) -> bool {
        match self
            .client
            .get(self.config.endpoint("tags"))
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(provider = PROVIDER, error = %e, "liveness probe failed");
                false
            }
        }
    }

    /// Poll the server until it answers, up to `readiness_retries` probes
    /// spaced `readiness_backoff` apart.
    ///
    /// Returns `false` if the server never became reachable.
    pub async fn wait_until_ready(&self) -> bool {
        let retries = self.config.readiness_retries.max(1);
        for attempt in 1..=retries {
            if self.is_ready().await {
                info!(provider = PROVIDER, url = %self.config.base_url, "server is ready");
                return true;
            }
            if attempt < retries {
                info!(provider = PROVIDER, attempt, retries, "waiting for server");
                tokio::time::sleep(self.config.readiness_backoff).await;
            }
        }
        error!(provider = PROVIDER, url = %self.config.base_url, "server is not available");
        false
    }

    /// List the names of models available on the server.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] on transport failure, non-success
    /// status or an unreadable body.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.config.endpoint("tags"))
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .map_err(|e| RagError::PipelineError(format!("listing models failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RagError::PipelineError(format!("listing models failed: HTTP {status}")));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| RagError::PipelineError(format!("failed to parse model list: {e}")))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Make sure `model` is available, pulling it if the server lacks it.
    ///
    /// An empty model name is a no-op. A failure to list models is logged and
    /// treated as "not present".
    ///
    /// # Errors
    ///
    /// Returns [`RagError::PipelineError`] if the pull fails.
    pub async fn ensure_model(&self, model: &str) -> Result<()> {
        if model.is_empty() {
            return Ok(());
        }

        let present = match self.list_models().await {
            Ok(models) => models.iter().any(|m| m == model),
            Err(e) => {
                warn!(provider = PROVIDER, error = %e, "could not list models");
                false
            }
        };
        if present {
            return Ok(());
        }

        info!(provider = PROVIDER, model, "pulling model");
        let response = self
            .client
            .post(self.config.endpoint("pull"))
            .timeout(self.config.pull_timeout)
            .json(&PullRequest { model, stream: false })
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, model, error = %e, "pull request failed");
                RagError::PipelineError(format!("failed to pull model '{model}': {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(provider = PROVIDER, model, %status, "pull rejected");
            return Err(RagError::PipelineError(format!(
                "failed to pull model '{model}': HTTP {status} {body}"
            )));
        }

        info!(provider = PROVIDER, model, "model ready");
        Ok(())
    }

    /// Make sure both the completion and the embedding model are available.
    ///
    /// Both pulls are attempted even if the first fails.
    pub async fn ensure_models(&self) -> Result<()> {
        let main = self.ensure_model(&self.config.model).await;
        let embed = self.ensure_model(&self.config.embed_model).await;
        main.and(embed)
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Option<Vec<Vec<f32>>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

// ── Trait implementations ──────────────────────────────────────────

fn embedding_error(message: impl Into<String>) -> RagError {
    RagError::EmbeddingError { provider: PROVIDER.into(), message: message.into() }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(
            provider = PROVIDER,
            model = %self.config.embed_model,
            text_len = text.len(),
            "embedding text"
        );

        let response = self
            .client
            .post(self.config.endpoint("embed"))
            .timeout(self.config.embed_timeout)
            .json(&EmbedRequest { model: &self.config.embed_model, input: text })
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "embedding request failed");
                embedding_error(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(provider = PROVIDER, %status, "embedding API error");
            return Err(embedding_error(format!("API returned {status}")));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse embedding response");
            embedding_error(format!("failed to parse response: {e}"))
        })?;

        body.embeddings
            .and_then(|embeddings| embeddings.into_iter().next())
            .ok_or_else(|| embedding_error("response contained no embeddings"))
    }

    fn name(&self) -> &str {
        &self.config.embed_model
    }
}

#[async_trait]
impl Completer for OllamaClient {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        debug!(
            provider = PROVIDER,
            model = %self.config.model,
            prompt_len = prompt.len(),
            "generating completion"
        );

        let response = self
            .client
            .post(self.config.endpoint("generate"))
            .timeout(self.config.generate_timeout)
            .json(&GenerateRequest { model: &self.config.model, prompt, stream: false })
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "completion request failed");
                GenerationError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(provider = PROVIDER, %status, "completion API error");
            return Err(GenerationError::Status { status: status.as_u16(), body });
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse completion response");
            GenerationError::Malformed(e.to_string())
        })?;

        match body.response {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Ok(NO_RESPONSE.to_string()),
        }
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
