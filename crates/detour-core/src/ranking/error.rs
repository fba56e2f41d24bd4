use thiserror::Error;

use crate::index::IndexError;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("invalid top_k {requested}: must be at least 1")]
    InvalidTopK { requested: usize },

    #[error("invalid query risk {value}: must be within [0, 1]")]
    InvalidRisk { value: f32 },

    #[error("index query failed: {0}")]
    Index(#[from] IndexError),
}
