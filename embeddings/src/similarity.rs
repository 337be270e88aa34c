//! Similarity computation for embeddings.

use serde::{Deserialize, Serialize};

use crate::NORM_EPSILON;
use crate::error::{EmbeddingError, Result};

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical vectors
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite vectors
///
/// Only used as a reference for `ScoreMapping::Cosine` in tests.
#[cfg(test)]
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a = l2_norm(a);
    let magnitude_b = l2_norm(b);

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (magnitude_a * magnitude_b))
}

/// Compute the euclidean distance between two embeddings.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let sum: f32 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();

    Ok(sum.sqrt())
}

/// L2 norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale an embedding to unit length.
///
/// Divides by `norm + NORM_EPSILON`, so an all-zero vector stays all-zero
/// instead of turning into NaNs.
pub fn normalize(embedding: &mut [f32]) {
    let denominator = l2_norm(embedding) + NORM_EPSILON;
    for x in embedding.iter_mut() {
        *x /= denominator;
    }
}

/// How a Euclidean distance between unit vectors becomes a similarity score.
///
/// For unit vectors `d² = 2 − 2·cos`, so both mappings decrease as `d` grows
/// and rank neighbors identically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMapping {
    /// Exact cosine similarity, `1 − d²/2`.
    #[default]
    Cosine,
    /// Linear approximation, `1 − d`. Drifts below -1 once `d > 2`.
    Linear,
}

impl ScoreMapping {
    /// Convert a distance between normalized vectors into a score.
    pub fn score(self, distance: f32) -> f32 {
        match self {
            ScoreMapping::Cosine => 1.0 - distance * distance / 2.0,
            ScoreMapping::Linear => 1.0 - distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(
            euclidean_distance(&a, &b),
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_yields_unit_norm() {
        let vectors = [
            vec![0.25, -3.5, 12.0, 0.0],
            vec![1e-3, 2e-3, -4e-3],
            vec![1000.0, 1.0],
        ];
        for mut v in vectors {
            normalize(&mut v);
            assert!((l2_norm(&v) - 1.0).abs() < 1e-5, "norm was {}", l2_norm(&v));
        }
    }

    #[test]
    fn test_normalize_zero_vector_stays_zero() {
        let mut v = vec![0.0; 4];
        normalize(&mut v);
        assert_eq!(v, vec![0.0; 4]);
    }

    #[test]
    fn test_score_mappings_agree_with_cosine() {
        let mut a = vec![0.9, 0.1];
        let mut b = vec![1.0, 0.0];
        normalize(&mut a);
        normalize(&mut b);

        let distance = euclidean_distance(&a, &b).unwrap();
        let cosine = cosine_similarity(&a, &b).unwrap();

        assert!((ScoreMapping::Cosine.score(distance) - cosine).abs() < 1e-5);
        assert!(ScoreMapping::Linear.score(distance) <= cosine);
    }

    #[test]
    fn test_score_mapping_bounds() {
        assert_eq!(ScoreMapping::Cosine.score(0.0), 1.0);
        assert_eq!(ScoreMapping::Cosine.score(2.0), -1.0);
        assert_eq!(ScoreMapping::Linear.score(1.0), 0.0);
    }
}
