//! # Embeddings
//!
//! This crate turns text into dense vectors through an external embedding
//! provider and answers nearest-neighbor queries over a fixed set of them.
//!
//! ## Features
//!
//! - **Embedding Providers**: Ollama through its CLI or its HTTP API
//! - **Similarity Index**: Normalized rows searched by Euclidean distance
//! - **Graceful Degradation**: Failed embeddings fall back to zero vectors
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► Embedding ──► SimilarityIndex           │
//! │       │                    │              │                     │
//! │       ▼                    ▼              ▼                     │
//! │  ExternalCommand       normalize      Neighbor                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod command;
pub mod error;
pub mod index;
pub mod provider;
pub mod similarity;

pub use command::ExternalCommand;
pub use error::{EmbeddingError, Result};
pub use index::{Neighbor, SimilarityIndex};
pub use provider::{EmbeddingProvider, OllamaCliProvider, OllamaHttpProvider};
pub use similarity::{ScoreMapping, euclidean_distance, normalize};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension of `llama3.2:1b` embeddings, the default model.
pub const DEFAULT_DIMENSION: usize = 2048;

/// Added to the L2 norm before dividing so zero vectors stay finite.
pub const NORM_EPSILON: f32 = 1e-10;
