//! In-memory vector index for one transcript's passages.
//!
//! Vectors are stored at unit length so cosine similarity is a plain dot product.
//! Search is exact: every stored vector is scored.

use crate::error::{Result, TubechatError};
use std::cmp::Ordering;

/// Scale a vector to unit length in place. Zero vectors are left as zeros.
///
/// Components are first divided by the largest magnitude, so the norm of any
/// finite vector stays finite.
pub fn normalize(vector: &mut [f32]) {
    let largest = vector.iter().fold(0.0_f32, |m, x| m.max(x.abs()));
    if largest == 0.0 || !largest.is_finite() {
        return;
    }
    let norm = vector
        .iter()
        .map(|x| (x / largest) * (x / largest))
        .sum::<f32>()
        .sqrt();
    for x in vector.iter_mut() {
        *x = (*x / largest) / norm;
    }
}

/// Whether every component is a finite number.
pub fn is_finite(vector: &[f32]) -> bool {
    vector.iter().all(|x| x.is_finite())
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Read-only index of unit vectors, addressed by position.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// An index with no vectors. Searching it always yields nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from vectors whose positions match passage indexes.
    ///
    /// Every vector must share the first vector's dimension and hold only
    /// finite values; vectors are normalized as they are stored.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimensions = vectors.first().map(Vec::len).unwrap_or(0);

        let mut stored = Vec::with_capacity(vectors.len());
        for (position, mut vector) in vectors.into_iter().enumerate() {
            if vector.len() != dimensions {
                return Err(TubechatError::DimensionMismatch {
                    expected: dimensions,
                    found: vector.len(),
                    position,
                });
            }
            if !is_finite(&vector) {
                return Err(TubechatError::Provider(format!(
                    "embedding at position {} has non-finite values",
                    position
                )));
            }
            normalize(&mut vector);
            stored.push(vector);
        }

        Ok(Self {
            dimensions,
            vectors: stored,
        })
    }

    /// Return up to `k` `(position, score)` pairs, best first.
    ///
    /// Scores are dot products against the normalized query, so they fall in
    /// [-1, 1]. Equal scores are ordered by ascending position.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if self.vectors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(TubechatError::DimensionMismatch {
                expected: self.dimensions,
                found: query.len(),
                position: 0,
            });
        }
        if !is_finite(query) {
            return Err(TubechatError::InvalidInput(
                "query vector has non-finite values".to_string(),
            ));
        }

        let mut query = query.to_vec();
        normalize(&mut query);

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, dot(&query, vector)))
            .collect();

        scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        scored.truncate(k);

        Ok(scored)
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Shared vector dimension (0 for an empty index).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}
