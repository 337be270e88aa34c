//! Error types for the embeddings system.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmbeddingError {
    /// The provider could not be reached, exited with a failure, or timed out.
    #[error("embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider answered with an empty body.
    #[error("embedding provider returned an empty response")]
    EmptyResponse,

    /// The body was not valid JSON or did not carry an `embedding` array.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Neighbor count outside `1..=len`.
    #[error("invalid k: {k} (index holds {len} rows)")]
    InvalidK { k: usize, len: usize },
}
