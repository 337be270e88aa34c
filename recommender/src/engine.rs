//! Recommendation engine implementation.

use std::sync::Arc;

use coach_embeddings::{
    DEFAULT_DIMENSION, EmbeddingError, EmbeddingProvider, ScoreMapping, SimilarityIndex, normalize,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RecommenderConfig;
use crate::corpus::{JobCorpus, JobPosting};
use crate::error::{RecommenderError, Result};

/// A scored match for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    /// The matched posting, shared with the corpus.
    pub job: Arc<JobPosting>,

    /// Similarity score, higher is better.
    pub score: f32,
}

/// Recommends job roles for free-text profiles.
///
/// Built once at startup: every posting is embedded a single time and the
/// resulting index is never modified. Queries take `&self`, so the
/// recommender can be shared by reference with whatever layer needs it.
pub struct CareerRecommender {
    /// Job postings, row `i` of the index is posting `i`.
    corpus: JobCorpus,

    /// Normalized posting embeddings.
    index: SimilarityIndex,

    /// Provider used for both the corpus and queries.
    provider: Arc<dyn EmbeddingProvider>,

    /// How distances become scores.
    score_mapping: ScoreMapping,
}

impl CareerRecommender {
    /// Create a new recommender builder.
    pub fn builder(
        corpus: JobCorpus,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> CareerRecommenderBuilder {
        CareerRecommenderBuilder::new(corpus, provider)
    }

    /// Load the corpus and build the index described by `config`.
    pub async fn from_config(config: &RecommenderConfig) -> Result<Self> {
        config.validate()?;

        // Fatal on failure, and before any embedding call.
        let corpus = JobCorpus::load(&config.corpus_path).await?;
        let provider = config.embedding.build_provider();

        Self::builder(corpus, provider)
            .with_dimension(config.embedding.dimension)
            .with_score_mapping(config.query.score_mapping)
            .build()
            .await
    }

    /// Recommend up to `k` roles for `user_text`, best match first.
    ///
    /// `k` larger than the corpus is clamped to the corpus size; `k == 0`
    /// fails with `InvalidK`. If the provider cannot embed the text, a zero
    /// vector stands in for it: the call still returns results, ranked
    /// arbitrarily, rather than failing. Equal scores keep corpus order.
    pub async fn recommend_roles(
        &self,
        user_text: &str,
        k: usize,
    ) -> Result<Vec<RecommendationResult>> {
        if user_text.trim().is_empty() {
            return Err(RecommenderError::EmptyQuery);
        }

        let len = self.corpus.len();
        if k == 0 {
            return Err(EmbeddingError::InvalidK { k, len }.into());
        }
        let k = if k > len {
            debug!(requested = k, corpus = len, "Clamping k to corpus size");
            len
        } else {
            k
        };

        let mut query = self.embed_query(user_text).await;
        normalize(&mut query);

        let neighbors = self.index.query(&query, k)?;

        let results: Vec<RecommendationResult> = neighbors
            .into_iter()
            .map(|neighbor| RecommendationResult {
                job: Arc::clone(&self.corpus.postings()[neighbor.row]),
                score: self.score_mapping.score(neighbor.distance),
            })
            .collect();

        debug!(results = results.len(), "Recommended roles");
        Ok(results)
    }

    /// Embed the query, substituting a zero vector when the provider fails.
    async fn embed_query(&self, user_text: &str) -> Vec<f32> {
        match self.provider.embed(user_text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Failed to embed user text, using zero vector"
                );
                vec![0.0; self.index.dimension()]
            }
        }
    }

    /// The job corpus.
    pub fn corpus(&self) -> &JobCorpus {
        &self.corpus
    }

    /// The similarity index.
    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    /// Get recommender statistics.
    pub fn stats(&self) -> RecommenderStats {
        RecommenderStats {
            postings: self.corpus.len(),
            dimension: self.index.dimension(),
            fallback_rows: self.index.fallback_rows().len(),
            provider: self.provider.name().to_string(),
            model: self.provider.model().to_string(),
        }
    }
}

/// Builder for [`CareerRecommender`].
pub struct CareerRecommenderBuilder {
    corpus: JobCorpus,
    provider: Arc<dyn EmbeddingProvider>,
    dimension: usize,
    score_mapping: ScoreMapping,
}

impl CareerRecommenderBuilder {
    /// Create a new builder.
    pub fn new(corpus: JobCorpus, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            corpus,
            provider,
            dimension: DEFAULT_DIMENSION,
            score_mapping: ScoreMapping::default(),
        }
    }

    /// Set the expected embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the score mapping.
    pub fn with_score_mapping(mut self, mapping: ScoreMapping) -> Self {
        self.score_mapping = mapping;
        self
    }

    /// Embed the corpus and build the recommender.
    pub async fn build(self) -> Result<CareerRecommender> {
        if self.dimension == 0 {
            return Err(RecommenderError::Config(
                "embedding dimension must be positive".to_string(),
            ));
        }

        info!(
            postings = self.corpus.len(),
            provider = self.provider.name(),
            model = self.provider.model(),
            "Building recommender index"
        );

        let index = SimilarityIndex::build(
            self.corpus.iter().map(|posting| posting.embedding_text()),
            self.provider.as_ref(),
            self.dimension,
        )
        .await?;

        if index.len() != self.corpus.len() {
            return Err(RecommenderError::Config(format!(
                "index has {} rows for {} postings",
                index.len(),
                self.corpus.len()
            )));
        }

        Ok(CareerRecommender {
            corpus: self.corpus,
            index,
            provider: self.provider,
            score_mapping: self.score_mapping,
        })
    }
}

/// Statistics about the recommender.
#[derive(Debug, Clone, Serialize)]
pub struct RecommenderStats {
    /// Number of postings indexed.
    pub postings: usize,

    /// Embedding dimension.
    pub dimension: usize,

    /// Postings indexed with the zero-vector fallback.
    pub fallback_rows: usize,

    /// Provider name.
    pub provider: String,

    /// Embedding model.
    pub model: String,
}
