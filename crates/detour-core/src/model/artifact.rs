//! Serialized model artifact format.
//!
//! The artifact is a JSON document produced by the offline training
//! pipeline. It carries the classifier weights, the feature schema the
//! weights were trained against, and a linear projection from the feature
//! space into the catalog's embedding space.

use serde::{Deserialize, Serialize};

use super::error::ModelError;

/// One feature the classifier consumes: position in the vector is given
/// by its index in [`ModelArtifact::features`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub min: f32,
    pub max: f32,
}

/// On-disk shape of the risk model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_version: String,

    /// RFC 3339 timestamp of the training run.
    pub trained_at: String,

    pub features: Vec<FeatureSpec>,

    /// Logistic-regression weights, one per feature.
    pub weights: Vec<f32>,

    pub bias: f32,

    /// Row-major projection matrix into the catalog embedding space:
    /// one row per embedding dimension, one column per feature.
    pub projection: Vec<Vec<f32>>,
}

impl ModelArtifact {
    /// Checks internal consistency; load fails before serving on any error.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.model_version.trim().is_empty() {
            return Err(ModelError::ArtifactInvalid {
                reason: "model_version is empty".to_string(),
            });
        }

        chrono::DateTime::parse_from_rfc3339(&self.trained_at).map_err(|e| {
            ModelError::ArtifactInvalid {
                reason: format!("trained_at '{}' is not RFC 3339: {}", self.trained_at, e),
            }
        })?;

        if self.features.is_empty() {
            return Err(ModelError::ArtifactInvalid {
                reason: "feature schema is empty".to_string(),
            });
        }

        for spec in &self.features {
            if !spec.min.is_finite() || !spec.max.is_finite() || spec.min > spec.max {
                return Err(ModelError::ArtifactInvalid {
                    reason: format!(
                        "feature '{}' has invalid range [{}, {}]",
                        spec.name, spec.min, spec.max
                    ),
                });
            }
        }

        if self.weights.len() != self.features.len() {
            return Err(ModelError::ArtifactInvalid {
                reason: format!(
                    "{} weights for {} features",
                    self.weights.len(),
                    self.features.len()
                ),
            });
        }

        if self.weights.iter().any(|w| !w.is_finite()) || !self.bias.is_finite() {
            return Err(ModelError::ArtifactInvalid {
                reason: "weights and bias must be finite".to_string(),
            });
        }

        if self.projection.is_empty() {
            return Err(ModelError::ArtifactInvalid {
                reason: "projection matrix is empty".to_string(),
            });
        }

        for (i, row) in self.projection.iter().enumerate() {
            if row.len() != self.features.len() {
                return Err(ModelError::ArtifactInvalid {
                    reason: format!(
                        "projection row {} has {} columns, expected {}",
                        i,
                        row.len(),
                        self.features.len()
                    ),
                });
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ModelError::ArtifactInvalid {
                    reason: format!("projection row {} contains non-finite values", i),
                });
            }
        }

        Ok(())
    }
}
