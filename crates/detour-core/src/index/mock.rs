use super::{IndexError, NearestNeighbors, Neighbor};

/// Canned-response index for tests: returns the configured neighbors
/// (already sorted) truncated to `m`, after the same query validation as
/// the real index.
#[derive(Debug, Default)]
pub struct MockIndex {
    dim: usize,
    neighbors: Vec<Neighbor>,
}

impl MockIndex {
    pub fn new(dim: usize, neighbors: Vec<Neighbor>) -> Self {
        Self { dim, neighbors }
    }
}

impl NearestNeighbors for MockIndex {
    fn search(&self, query: &[f32], m: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }

        let mut neighbors = self.neighbors.clone();
        neighbors.truncate(m);
        Ok(neighbors)
    }

    fn dim(&self) -> usize {
        self.dim
    }
}
