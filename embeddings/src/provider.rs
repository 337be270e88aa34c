//! Embedding providers.
//!
//! Both providers talk to a local Ollama installation: one through its CLI,
//! one through its HTTP API. They share the response schema
//! `{ "embedding": [f32, ...] }` and the error taxonomy in
//! [`EmbeddingError`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Embedding;
use crate::command::{DEFAULT_TIMEOUT, ExternalCommand};
use crate::error::{EmbeddingError, Result};

/// Default Ollama model used for embeddings.
pub const DEFAULT_EMBEDDING_MODEL: &str = "llama3.2:1b";

/// Default Ollama HTTP endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Trait for embedding providers.
///
/// Callers are responsible for rejecting empty text before calling
/// [`EmbeddingProvider::embed`]. Implementations make exactly one external
/// call per invocation and never retry or cache.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// The model every embedding from this provider comes from.
    fn model(&self) -> &str;

    /// Generate an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Embedding>;
}

/// Wire format of an embedding response. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct EmbeddingPayload {
    embedding: Vec<f32>,
}

/// Validate a raw response body and extract its embedding.
pub fn parse_embedding_response(body: &str) -> Result<Embedding> {
    if body.trim().is_empty() {
        return Err(EmbeddingError::EmptyResponse);
    }

    let payload: EmbeddingPayload = serde_json::from_str(body.trim())
        .map_err(|e| EmbeddingError::MalformedResponse(e.to_string()))?;

    if payload.embedding.is_empty() {
        return Err(EmbeddingError::MalformedResponse(
            "embedding array is empty".to_string(),
        ));
    }

    Ok(payload.embedding)
}

/// Embeddings through `ollama embeddings --model <model> <text>`.
pub struct OllamaCliProvider {
    command: ExternalCommand,
    model: String,
}

impl OllamaCliProvider {
    /// Create a provider that runs the `ollama` binary from `PATH`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            command: ExternalCommand::new("ollama"),
            model: model.into(),
        }
    }

    /// Replace the command template (program, leading arguments, timeout).
    pub fn with_command(mut self, command: ExternalCommand) -> Self {
        self.command = command;
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command = self.command.with_timeout(timeout);
        self
    }
}

impl Default for OllamaCliProvider {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_MODEL)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaCliProvider {
    fn name(&self) -> &str {
        "ollama-cli"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        debug!(model = %self.model, chars = text.len(), "Embedding via ollama CLI");
        let stdout = self
            .command
            .run(&["embeddings", "--model", &self.model, text], None)
            .await?;
        parse_embedding_response(&stdout)
    }
}

/// Request body for `POST /api/embeddings`.
#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Embeddings through the Ollama HTTP API.
pub struct OllamaHttpProvider {
    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Model name.
    model: String,

    /// Per-request timeout.
    timeout: Duration,
}

impl OllamaHttpProvider {
    /// Create a provider against the default local endpoint.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            client: reqwest::Client::new(),
            model: model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for OllamaHttpProvider {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_MODEL)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaHttpProvider {
    fn name(&self) -> &str {
        "ollama-http"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let url = format!("{}/api/embeddings", self.base_url.trim_end_matches('/'));
        debug!(model = %self.model, %url, "Embedding via ollama HTTP API");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&OllamaEmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EmbeddingError::ProviderUnavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(EmbeddingError::ProviderUnavailable(format!(
                "API error ({status}): {}",
                body.trim()
            )));
        }

        parse_embedding_response(&body)
    }
}
