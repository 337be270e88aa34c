//! Job corpus loading.
//!
//! The corpus is a JSON array of postings. Each object needs `title`,
//! `description` and `tags`; any other field (an `id`, a company name) is
//! ignored. Array order is the stable index shared with the similarity
//! index: posting `i` is row `i`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RecommenderError, Result};

/// A job posting. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobPosting {
    /// Position in the corpus.
    pub id: usize,

    /// Role title.
    pub title: String,

    /// Role description.
    pub description: String,

    /// Skill tags, in file order.
    pub tags: Vec<String>,
}

impl JobPosting {
    /// Text embedded for this posting.
    pub fn embedding_text(&self) -> String {
        format!("{} -- {}", self.title, self.description)
    }
}

/// On-disk shape of a posting.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl JobRecord {
    /// Create a record.
    pub fn new<T: Into<String>>(
        title: impl Into<String>,
        description: impl Into<String>,
        tags: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// The fixed, ordered collection of postings recommendations come from.
#[derive(Debug, Clone)]
pub struct JobCorpus {
    postings: Vec<Arc<JobPosting>>,
    source: Option<PathBuf>,
}

impl JobCorpus {
    /// Load a corpus from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| corpus_error(path, e))?;

        let mut corpus = Self::parse(&json, path)?;
        corpus.source = Some(path.to_path_buf());

        info!(path = %path.display(), postings = corpus.len(), "Loaded job corpus");
        Ok(corpus)
    }

    /// Parse a corpus from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::parse(json, Path::new("<inline>"))
    }

    /// Build a corpus from records, assigning ids by position.
    pub fn from_records(records: Vec<JobRecord>) -> Result<Self> {
        Self::from_records_at(records, Path::new("<inline>"))
    }

    fn parse(json: &str, origin: &Path) -> Result<Self> {
        let records: Vec<JobRecord> =
            serde_json::from_str(json).map_err(|e| corpus_error(origin, e))?;
        Self::from_records_at(records, origin)
    }

    fn from_records_at(records: Vec<JobRecord>, origin: &Path) -> Result<Self> {
        if records.is_empty() {
            return Err(corpus_error(origin, "corpus contains no job postings"));
        }

        let postings = records
            .into_iter()
            .enumerate()
            .map(|(id, record)| {
                Arc::new(JobPosting {
                    id,
                    title: record.title,
                    description: record.description,
                    tags: record.tags,
                })
            })
            .collect();

        Ok(Self {
            postings,
            source: None,
        })
    }

    /// Get a posting by id.
    pub fn get(&self, id: usize) -> Option<&Arc<JobPosting>> {
        self.postings.get(id)
    }

    /// All postings in corpus order.
    pub fn postings(&self) -> &[Arc<JobPosting>] {
        &self.postings
    }

    /// Iterate over postings in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<JobPosting>> {
        self.postings.iter()
    }

    /// File the corpus was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Get the number of postings.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

fn corpus_error(path: &Path, err: impl std::fmt::Display) -> RecommenderError {
    RecommenderError::CorpusLoad {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
