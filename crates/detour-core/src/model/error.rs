use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or applying the risk model artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {source}")]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact: {reason}")]
    ArtifactInvalid { reason: String },

    #[error("feature vector has {actual} entries, model expects {expected}")]
    FeatureArity { expected: usize, actual: usize },

    #[error("feature '{name}' value {value} outside allowed range [{min}, {max}]")]
    FeatureOutOfRange {
        name: String,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("feature '{name}' is not a finite number")]
    FeatureNotFinite { name: String },
}

impl ModelError {
    /// Returns `true` when the error was caused by caller input rather
    /// than the artifact or the process state.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ModelError::FeatureArity { .. }
                | ModelError::FeatureOutOfRange { .. }
                | ModelError::FeatureNotFinite { .. }
        )
    }
}
