use thiserror::Error;

/// Errors from building or querying the vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("query dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("query embedding contains non-finite values")]
    NonFiniteQuery,

    #[error("index cannot be built over zero-dimensional embeddings")]
    ZeroDimension,
}
