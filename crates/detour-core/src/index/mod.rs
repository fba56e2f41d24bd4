//! In-process nearest-neighbor index over catalog embeddings.
//!
//! The index is built once at startup from the loaded catalog and shared
//! read-only across request handlers. Search is an exact scan: the
//! catalog is bounded and immutable, which keeps results deterministic
//! and avoids graph maintenance that only pays off under online inserts.

pub mod error;

#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(test)]
mod tests;

pub use error::IndexError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockIndex;

use std::str::FromStr;

use tracing::info;

use crate::catalog::AlternativesCatalog;

/// Distance metric used for similarity search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Cosine similarity over normalized vectors (default).
    Cosine,
    /// Euclidean distance, mapped to a similarity in `(0, 1]`.
    Euclidean,
}

impl FromStr for DistanceMetric {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" => Ok(DistanceMetric::Euclidean),
            _ => Err(()),
        }
    }
}

/// A search hit: stable catalog position plus similarity in `[0, 1]`
/// (cosine is clamped at zero; opposite-direction vectors are not more
/// useful than orthogonal ones for ranking substitutes).
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub similarity: f32,
}

/// Read-only nearest-neighbor lookup. Implemented by [`VectorIndex`] and
/// by the mock used in tests.
pub trait NearestNeighbors {
    /// Returns up to `m` neighbors, descending by similarity, ties broken
    /// by catalog position.
    fn search(&self, query: &[f32], m: usize) -> Result<Vec<Neighbor>, IndexError>;

    /// Embedding dimensionality this index was built over.
    fn dim(&self) -> usize;
}

/// Exact nearest-neighbor index over the catalog embeddings.
#[derive(Debug)]
pub struct VectorIndex {
    metric: DistanceMetric,
    dim: usize,
    /// One row per catalog entry, normalized when the metric is cosine.
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Builds the index from the loaded catalog. One-time cost at
    /// startup; lookups never mutate it.
    pub fn build(
        catalog: &AlternativesCatalog,
        metric: DistanceMetric,
    ) -> Result<Self, IndexError> {
        let dim = catalog.embedding_dim();
        if dim == 0 {
            return Err(IndexError::ZeroDimension);
        }

        let vectors = catalog
            .entries()
            .iter()
            .map(|entry| match metric {
                DistanceMetric::Cosine => normalize(&entry.embedding),
                DistanceMetric::Euclidean => entry.embedding.clone(),
            })
            .collect::<Vec<_>>();

        info!(
            entries = vectors.len(),
            dim,
            ?metric,
            "Vector index built"
        );

        Ok(Self {
            metric,
            dim,
            vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    fn similarity(&self, query: &[f32], position: usize) -> f32 {
        let stored = &self.vectors[position];
        match self.metric {
            DistanceMetric::Cosine => dot(query, stored).max(0.0),
            DistanceMetric::Euclidean => {
                let dist: f32 = query
                    .iter()
                    .zip(stored)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>()
                    .sqrt();
                1.0 / (1.0 + dist)
            }
        }
    }
}

impl NearestNeighbors for VectorIndex {
    fn search(&self, query: &[f32], m: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(IndexError::NonFiniteQuery);
        }
        if m == 0 {
            return Ok(Vec::new());
        }

        let query = match self.metric {
            DistanceMetric::Cosine => normalize(query),
            DistanceMetric::Euclidean => query.to_vec(),
        };

        let mut neighbors: Vec<Neighbor> = (0..self.vectors.len())
            .map(|position| Neighbor {
                position,
                similarity: self.similarity(&query, position),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.position.cmp(&b.position))
        });
        neighbors.truncate(m);

        Ok(neighbors)
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

#[inline]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Returns the unit vector, or the zero vector unchanged (a zero-norm
/// embedding scores zero similarity against everything).
fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = dot(v, v).sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return v.to_vec();
    }
    v.iter().map(|x| x / norm).collect()
}
