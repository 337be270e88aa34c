//! # Career Recommender
//!
//! This crate recommends job roles for a free-text profile and hands the
//! matches to a local language model for a learning roadmap. It combines:
//!
//! - **Job Corpus**: A fixed, ordered set of postings loaded at startup
//! - **Embeddings**: One vector per posting, searched by nearest neighbor
//! - **Roadmap**: A coaching prompt built from the top matches
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Career Recommender                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │  JobCorpus   │  │  Embedding   │  │  Similarity  │          │
//! │  │              │  │  Provider    │  │  Index       │          │
//! │  └──────────────┘  └──────────────┘  └──────────────┘          │
//! │         │                │                  │                   │
//! │         └────────────────┼──────────────────┘                   │
//! │                          ▼                                      │
//! │                  ┌──────────────┐                               │
//! │                  │   Career     │                               │
//! │                  │ Recommender  │                               │
//! │                  └──────────────┘                               │
//! │                          │                                      │
//! │                          ▼                                      │
//! │                  ┌──────────────┐                               │
//! │                  │  summarize   │──► RoadmapGenerator           │
//! │                  └──────────────┘                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coach_recommender::{CareerRecommender, RecommenderConfig, summarize};
//!
//! let config = RecommenderConfig::new("data/jobs.json");
//! let recommender = CareerRecommender::from_config(&config).await?;
//!
//! let roles = recommender
//!     .recommend_roles("I know Python and want to work in ML", 3)
//!     .await?;
//! println!("{}", summarize(&roles));
//! ```

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod roadmap;
pub mod summary;

pub use config::{
    EmbeddingConfig, EmbeddingProviderType, QueryConfig, RecommenderConfig, RoadmapConfig,
};
pub use corpus::{JobCorpus, JobPosting, JobRecord};
pub use engine::{
    CareerRecommender, CareerRecommenderBuilder, RecommendationResult, RecommenderStats,
};
pub use error::{RecommenderError, Result};
pub use roadmap::{OllamaRoadmapGenerator, RoadmapGenerator, RoadmapPrompt, generate_plan};
pub use summary::summarize;

// Re-export from dependencies for convenience
pub use coach_embeddings::{EmbeddingProvider, ScoreMapping, SimilarityIndex};
