use thiserror::Error;

/// Per-request and startup errors surfaced by the orchestrator.
///
/// Per-request variants map onto the service's wire taxonomy at the
/// gateway boundary; startup variants abort initialization.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("request deadline exceeded")]
    Timeout,

    #[error("request cancelled by caller")]
    Cancelled,

    #[error(
        "embedding dimension mismatch: model projects into {model}, catalog/index carry {catalog}"
    )]
    DimensionMismatch { model: usize, catalog: usize },

    #[error("internal error: {reason}")]
    InternalError { reason: String },
}
