//! Error types for the recommender.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for recommender operations.
pub type Result<T> = std::result::Result<T, RecommenderError>;

/// Errors that can occur in the recommender.
#[derive(Error, Debug)]
pub enum RecommenderError {
    /// The job corpus could not be read or parsed.
    #[error("failed to load corpus from {}: {message}", path.display())]
    CorpusLoad { path: PathBuf, message: String },

    /// The user text was empty or whitespace only.
    #[error("user text is empty")]
    EmptyQuery,

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] coach_embeddings::EmbeddingError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Roadmap generation failed.
    #[error("roadmap generation failed: {0}")]
    Roadmap(String),
}
