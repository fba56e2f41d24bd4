//! Risk model adapter.
//!
//! Wraps the serialized classifier artifact behind a pure scoring
//! function. The artifact is loaded once at startup; scoring afterwards
//! is deterministic and side-effect free.

pub mod artifact;
pub mod error;


pub use artifact::{FeatureSpec, ModelArtifact};
pub use error::ModelError;

use std::path::Path;

use tracing::info;

/// Bounded classifier output plus the model version that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskScore {
    /// Probability-like value in `[0, 1]`.
    pub value: f32,
    pub model_version: String,
}

/// Pre-trained logistic risk classifier with a feature-to-embedding
/// projection.
#[derive(Debug, Clone)]
pub struct RiskModel {
    artifact: ModelArtifact,
}

impl RiskModel {
    /// Loads and validates the artifact. Any failure here is fatal at
    /// startup; the process must not begin serving without a model.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;

        let artifact: ModelArtifact =
            serde_json::from_str(&raw).map_err(|source| ModelError::ArtifactParse {
                path: path.to_path_buf(),
                source,
            })?;

        let model = Self::from_artifact(artifact)?;

        info!(
            path = %path.display(),
            model_version = %model.artifact.model_version,
            features = model.feature_arity(),
            embedding_dim = model.embedding_dim(),
            "Risk model loaded"
        );

        Ok(model)
    }

    /// Builds a model from an in-memory artifact (validated).
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn version(&self) -> &str {
        &self.artifact.model_version
    }

    pub fn feature_arity(&self) -> usize {
        self.artifact.features.len()
    }

    /// Dimensionality of the embedding space the projection maps into.
    pub fn embedding_dim(&self) -> usize {
        self.artifact.projection.len()
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.artifact.features
    }

    /// Scores a feature vector. Deterministic for identical input and
    /// model version; output is clamped to `[0, 1]`.
    pub fn score(&self, features: &[f32]) -> Result<RiskScore, ModelError> {
        self.validate_features(features)?;

        let mut z = self.artifact.bias;
        for (weight, value) in self.artifact.weights.iter().zip(features) {
            z += weight * value;
        }

        Ok(RiskScore {
            value: clamp01(sigmoid(z)),
            model_version: self.artifact.model_version.clone(),
        })
    }

    /// Projects a feature vector into the catalog embedding space.
    pub fn embed(&self, features: &[f32]) -> Result<Vec<f32>, ModelError> {
        self.validate_features(features)?;

        let embedding = self
            .artifact
            .projection
            .iter()
            .map(|row| row.iter().zip(features).map(|(p, x)| p * x).sum())
            .collect();

        Ok(embedding)
    }

    fn validate_features(&self, features: &[f32]) -> Result<(), ModelError> {
        if features.len() != self.artifact.features.len() {
            return Err(ModelError::FeatureArity {
                expected: self.artifact.features.len(),
                actual: features.len(),
            });
        }

        for (spec, &value) in self.artifact.features.iter().zip(features) {
            if !value.is_finite() {
                return Err(ModelError::FeatureNotFinite {
                    name: spec.name.clone(),
                });
            }
            if value < spec.min || value > spec.max {
                return Err(ModelError::FeatureOutOfRange {
                    name: spec.name.clone(),
                    value,
                    min: spec.min,
                    max: spec.max,
                });
            }
        }

        Ok(())
    }
}

#[cfg(any(test, feature = "mock"))]
impl RiskModel {
    /// Builds a small deterministic model for tests: `arity` unbounded
    /// features, weights 1.0, bias 0, identity-like projection into
    /// `embedding_dim` dimensions.
    pub fn stub(arity: usize, embedding_dim: usize) -> Self {
        let features = (0..arity)
            .map(|i| FeatureSpec {
                name: format!("f{}", i),
                min: -1e6,
                max: 1e6,
            })
            .collect();

        let projection = (0..embedding_dim)
            .map(|row| (0..arity).map(|col| if row == col { 1.0 } else { 0.0 }).collect())
            .collect();

        let artifact = ModelArtifact {
            model_version: "stub-1".to_string(),
            trained_at: "2026-01-01T00:00:00Z".to_string(),
            features,
            weights: vec![1.0; arity],
            bias: 0.0,
            projection,
        };

        Self::from_artifact(artifact).expect("stub artifact is valid")
    }
}

#[inline]
fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

#[inline]
fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}
