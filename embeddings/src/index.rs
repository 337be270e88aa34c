//! Similarity index for nearest-neighbor lookups.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::provider::EmbeddingProvider;
use crate::similarity::{euclidean_distance, normalize};

/// A neighbor returned by [`SimilarityIndex::query`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Row of the matched vector; equal to the position of its source text.
    pub row: usize,

    /// Euclidean distance between the normalized query and the row.
    pub distance: f32,
}

/// An immutable index of normalized embeddings.
///
/// Row `i` holds the normalized embedding of the `i`-th text the index was
/// built from. Rows are never inserted or removed after construction, and
/// queries take `&self`, so one index can serve concurrent readers.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    /// Normalized row vectors.
    rows: Vec<Embedding>,

    /// Dimension shared by every row.
    dimension: usize,

    /// Rows whose embedding failed and hold the zero-vector fallback.
    fallback_rows: Vec<usize>,
}

impl SimilarityIndex {
    /// Build an index from already computed embeddings.
    ///
    /// Every embedding must have `dimension` components.
    pub fn from_embeddings(dimension: usize, embeddings: Vec<Embedding>) -> Result<Self> {
        let mut rows = Vec::with_capacity(embeddings.len());
        for mut embedding in embeddings {
            if embedding.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            normalize(&mut embedding);
            rows.push(embedding);
        }

        Ok(Self {
            rows,
            dimension,
            fallback_rows: Vec::new(),
        })
    }

    /// Embed every text with `provider` and index the results.
    ///
    /// Texts are embedded one at a time, in order. A text whose embedding
    /// fails is logged and indexed as a zero vector so one bad item does not
    /// block the rest. An embedding of the wrong dimension is fatal: it means
    /// the provider and the configured dimension disagree.
    pub async fn build<P, I, S>(texts: I, provider: &P, dimension: usize) -> Result<Self>
    where
        P: EmbeddingProvider + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut embeddings = Vec::new();
        let mut fallback_rows = Vec::new();

        for (row, text) in texts.into_iter().enumerate() {
            match provider.embed(text.as_ref()).await {
                Ok(embedding) => {
                    if embedding.len() != dimension {
                        return Err(EmbeddingError::DimensionMismatch {
                            expected: dimension,
                            actual: embedding.len(),
                        });
                    }
                    debug!(row, "Embedded index row");
                    embeddings.push(embedding);
                }
                Err(e) => {
                    warn!(
                        row,
                        provider = provider.name(),
                        error = %e,
                        "Failed to embed index row, using zero vector"
                    );
                    embeddings.push(vec![0.0; dimension]);
                    fallback_rows.push(row);
                }
            }
        }

        let mut index = Self::from_embeddings(dimension, embeddings)?;
        index.fallback_rows = fallback_rows;

        info!(
            rows = index.len(),
            dimension,
            fallbacks = index.fallback_rows.len(),
            model = provider.model(),
            "Built similarity index"
        );
        Ok(index)
    }

    /// Return the `k` rows closest to `query`, nearest first.
    ///
    /// `query` must already be normalized. Rows at equal distance are ordered
    /// by ascending row number. Fails with `InvalidK` unless
    /// `1 <= k <= self.len()`; the index never clamps.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 || k > self.rows.len() {
            return Err(EmbeddingError::InvalidK {
                k,
                len: self.rows.len(),
            });
        }

        if query.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored = Vec::with_capacity(self.rows.len());
        for (row, embedding) in self.rows.iter().enumerate() {
            let distance = euclidean_distance(query, embedding)?;
            scored.push((OrderedFloat(distance), row));
        }

        // Tuple order: distance ascending, then row ascending.
        scored.sort_unstable();

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(distance, row)| Neighbor {
                row,
                distance: distance.0,
            })
            .collect())
    }

    /// Get the normalized vector stored at `row`.
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Rows that hold the zero-vector fallback.
    pub fn fallback_rows(&self) -> &[usize] {
        &self.fallback_rows
    }

    /// Dimension of every row.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Get the number of rows in the index.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::similarity::l2_norm;

    /// Returns fixed vectors per text and fails for unknown texts.
    struct TableProvider {
        table: HashMap<String, Embedding>,
    }

    impl TableProvider {
        fn new(entries: &[(&str, Vec<f32>)]) -> Self {
            Self {
                table: entries
                    .iter()
                    .map(|(text, v)| (text.to_string(), v.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for TableProvider {
        fn name(&self) -> &str {
            "table"
        }

        fn model(&self) -> &str {
            "table-model"
        }

        async fn embed(&self, text: &str) -> Result<Embedding> {
            self.table
                .get(text)
                .cloned()
                .ok_or_else(|| EmbeddingError::ProviderUnavailable(format!("no entry for {text}")))
        }
    }

    fn unit(v: &[f32]) -> Embedding {
        let mut v = v.to_vec();
        normalize(&mut v);
        v
    }

    #[test]
    fn test_from_embeddings_normalizes_rows() {
        let index =
            SimilarityIndex::from_embeddings(2, vec![vec![3.0, 4.0], vec![0.0, 10.0]]).unwrap();

        assert_eq!(index.len(), 2);
        for row in 0..index.len() {
            let stored = index.row(row).unwrap();
            assert!((l2_norm(stored) - 1.0).abs() < 1e-6);
        }
        assert!((index.row(0).unwrap()[0] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = SimilarityIndex::from_embeddings(3, vec![vec![1.0, 0.0, 0.0], vec![1.0]]);
        assert_eq!(
            result.unwrap_err(),
            EmbeddingError::DimensionMismatch {
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn test_query_orders_by_distance() {
        let index = SimilarityIndex::from_embeddings(
            3,
            vec![
                vec![0.0, 1.0, 0.0],
                vec![1.0, 0.0, 0.0],
                vec![0.7, 0.7, 0.0],
            ],
        )
        .unwrap();

        let neighbors = index.query(&unit(&[1.0, 0.0, 0.0]), 3).unwrap();
        let rows: Vec<usize> = neighbors.iter().map(|n| n.row).collect();

        assert_eq!(rows, vec![1, 2, 0]);
        assert!(neighbors[0].distance < 1e-6);
        assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_query_ties_break_by_row() {
        let index = SimilarityIndex::from_embeddings(
            2,
            vec![
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
            ],
        )
        .unwrap();

        let neighbors = index.query(&unit(&[1.0, 0.0]), 4).unwrap();
        let rows: Vec<usize> = neighbors.iter().map(|n| n.row).collect();
        assert_eq!(rows, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_query_invalid_k() {
        let index = SimilarityIndex::from_embeddings(2, vec![vec![1.0, 0.0]]).unwrap();

        assert_eq!(
            index.query(&[1.0, 0.0], 0).unwrap_err(),
            EmbeddingError::InvalidK { k: 0, len: 1 }
        );
        assert_eq!(
            index.query(&[1.0, 0.0], 2).unwrap_err(),
            EmbeddingError::InvalidK { k: 2, len: 1 }
        );
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = SimilarityIndex::from_embeddings(2, vec![vec![1.0, 0.0]]).unwrap();
        assert!(matches!(
            index.query(&[1.0, 0.0, 0.0], 1),
            Err(EmbeddingError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_query_is_equidistant_from_unit_rows() {
        let index =
            SimilarityIndex::from_embeddings(2, vec![vec![1.0, 0.0], vec![0.0, 2.0]]).unwrap();

        let neighbors = index.query(&[0.0, 0.0], 2).unwrap();
        assert_eq!(neighbors[0].row, 0);
        assert_eq!(neighbors[1].row, 1);
        assert!((neighbors[0].distance - neighbors[1].distance).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_build_falls_back_to_zero_vector() {
        let provider = TableProvider::new(&[("a", vec![1.0, 0.0]), ("c", vec![0.0, 1.0])]);

        let index = SimilarityIndex::build(["a", "b", "c"], &provider, 2)
            .await
            .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.fallback_rows(), &[1]);
        assert_eq!(index.row(1).unwrap().to_vec(), vec![0.0f32, 0.0]);
        assert!((index.row(2).unwrap()[1] - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_build_rejects_wrong_dimension() {
        let provider = TableProvider::new(&[("a", vec![1.0, 0.0]), ("b", vec![1.0, 0.0, 0.0])]);

        let result = SimilarityIndex::build(["a", "b"], &provider, 2).await;
        assert_eq!(
            result.unwrap_err(),
            EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[tokio::test]
    async fn test_build_with_dyn_provider() {
        let provider: Box<dyn EmbeddingProvider> =
            Box::new(TableProvider::new(&[("only", vec![2.0, 0.0])]));

        let index = SimilarityIndex::build(vec!["only".to_string()], provider.as_ref(), 2)
            .await
            .unwrap();
        assert_eq!(index.query(&[1.0, 0.0], 1).unwrap()[0].row, 0);
    }
}
