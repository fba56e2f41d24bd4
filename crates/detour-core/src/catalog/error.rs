use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading the alternatives catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("catalog is missing required column '{name}'")]
    MissingColumn { name: &'static str },

    #[error("catalog column '{name}' has unsupported type, expected {expected}")]
    ColumnType {
        name: &'static str,
        expected: &'static str,
    },

    #[error("catalog contains no usable rows")]
    Empty,

    #[error("catalog entries have inconsistent embedding dimensions: {first} vs {other}")]
    DimensionMismatch { first: usize, other: usize },
}
