use std::path::PathBuf;
use thiserror::Error;

/// Errors from the trust store and credential validation.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to read trust store {path}: {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse trust store {path}: {source}")]
    StoreParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("trust store contains no entries")]
    StoreEmpty,

    #[error("trust store entry '{name}' has an invalid key hash")]
    InvalidKeyHash { name: String },

    #[error("credential not recognized")]
    InvalidCredential,

    #[error("credential is deactivated")]
    InactiveCredential,
}

impl AuthError {
    /// Returns `true` for errors the caller should see as a plain
    /// authorization failure (never an internal error).
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredential | AuthError::InactiveCredential
        )
    }
}
