//! Configuration for the recommender.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use coach_embeddings::{
    DEFAULT_DIMENSION, EmbeddingProvider, ExternalCommand, OllamaCliProvider, OllamaHttpProvider,
    ScoreMapping,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecommenderError, Result};
use crate::roadmap::OllamaRoadmapGenerator;

/// Configuration for the recommender.
///
/// Every field has a default, so a TOML file only needs the values it
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Path to the job corpus JSON file.
    pub corpus_path: PathBuf,

    /// Embedding provider configuration.
    pub embedding: EmbeddingConfig,

    /// Query processing configuration.
    pub query: QueryConfig,

    /// Roadmap generation configuration.
    pub roadmap: RoadmapConfig,
}

impl RecommenderConfig {
    /// Create a new configuration with default values.
    pub fn new(corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            embedding: EmbeddingConfig::default(),
            query: QueryConfig::default(),
            roadmap: RoadmapConfig::default(),
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| RecommenderError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub async fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            RecommenderError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Self::from_toml_str(&text)
    }

    /// Set the corpus path.
    pub fn with_corpus_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corpus_path = path.into();
        self
    }

    /// Set the embedding configuration.
    pub fn with_embedding(mut self, config: EmbeddingConfig) -> Self {
        self.embedding = config;
        self
    }

    /// Set the query configuration.
    pub fn with_query(mut self, config: QueryConfig) -> Self {
        self.query = config;
        self
    }

    /// Set the roadmap configuration.
    pub fn with_roadmap(mut self, config: RoadmapConfig) -> Self {
        self.roadmap = config;
        self
    }

    /// Check values that would make the recommender unusable.
    pub fn validate(&self) -> Result<()> {
        if self.embedding.dimension == 0 {
            return Err(RecommenderError::Config(
                "embedding.dimension must be positive".to_string(),
            ));
        }
        if self.embedding.model.trim().is_empty() {
            return Err(RecommenderError::Config(
                "embedding.model must not be empty".to_string(),
            ));
        }
        if self.embedding.timeout_secs == 0 {
            return Err(RecommenderError::Config(
                "embedding.timeout_secs must be positive".to_string(),
            ));
        }
        if self.roadmap.timeout_secs == 0 {
            return Err(RecommenderError::Config(
                "roadmap.timeout_secs must be positive".to_string(),
            ));
        }
        if self.query.max_top_k == 0 {
            return Err(RecommenderError::Config(
                "query.max_top_k must be positive".to_string(),
            ));
        }
        if !(1..=self.query.max_top_k).contains(&self.query.default_top_k) {
            return Err(RecommenderError::Config(format!(
                "query.default_top_k must be between 1 and {}",
                self.query.max_top_k
            )));
        }
        Ok(())
    }
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self::new("data/jobs.json")
    }
}

/// Configuration for the embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Which provider to use.
    pub provider: EmbeddingProviderType,

    /// Model used for both corpus and query embeddings.
    pub model: String,

    /// Expected embedding dimension. Fixed here rather than inferred, since
    /// the zero-vector fallback needs it even when every call fails.
    pub dimension: usize,

    /// Timeout for a single embedding call, in seconds.
    pub timeout_secs: u64,

    /// Program run by the CLI provider.
    pub program: String,

    /// Base URL used by the HTTP provider.
    pub base_url: String,
}

impl EmbeddingConfig {
    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the provider type.
    pub fn with_provider(mut self, provider: EmbeddingProviderType) -> Self {
        self.provider = provider;
        self
    }

    /// Set the expected dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Construct the configured provider.
    pub fn build_provider(&self) -> Arc<dyn EmbeddingProvider> {
        match self.provider {
            EmbeddingProviderType::OllamaCli => {
                let command = ExternalCommand::new(&self.program).with_timeout(self.timeout());
                Arc::new(OllamaCliProvider::new(&self.model).with_command(command))
            }
            EmbeddingProviderType::OllamaHttp => Arc::new(
                OllamaHttpProvider::new(&self.model)
                    .with_base_url(&self.base_url)
                    .with_timeout(self.timeout()),
            ),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::OllamaCli,
            model: coach_embeddings::provider::DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension: DEFAULT_DIMENSION,
            timeout_secs: 60,
            program: "ollama".to_string(),
            base_url: coach_embeddings::provider::DEFAULT_OLLAMA_URL.to_string(),
        }
    }
}

/// Type of embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderType {
    /// `ollama embeddings` on the command line.
    OllamaCli,
    /// Ollama HTTP API.
    OllamaHttp,
}

/// Configuration for query processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Number of roles suggested when the caller does not ask for a count.
    pub default_top_k: usize,

    /// Largest number of roles a caller may ask for.
    pub max_top_k: usize,

    /// How distances become scores.
    pub score_mapping: ScoreMapping,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_top_k: 3,
            max_top_k: 5,
            score_mapping: ScoreMapping::default(),
        }
    }
}

/// Configuration for roadmap generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadmapConfig {
    /// Whether to generate a roadmap after recommending roles.
    pub enabled: bool,

    /// Generation model.
    pub model: String,

    /// Program that runs the model.
    pub program: String,

    /// Timeout for the generation call, in seconds.
    pub timeout_secs: u64,
}

impl RoadmapConfig {
    /// Construct the configured generator.
    pub fn build_generator(&self) -> OllamaRoadmapGenerator {
        OllamaRoadmapGenerator::new(&self.model).with_command(
            ExternalCommand::new(&self.program)
                .with_timeout(Duration::from_secs(self.timeout_secs)),
        )
    }
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "llama3.2:3b".to_string(),
            program: "ollama".to_string(),
            timeout_secs: 300,
        }
    }
}
