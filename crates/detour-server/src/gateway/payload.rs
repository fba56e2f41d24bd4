//! Wire payloads for the scoring endpoint.

use serde::{Deserialize, Serialize};

use detour::{RankedAlternative, ScoreOutcome};

/// Body of `POST /v1/score`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreRequestBody {
    pub item_id: Option<String>,
    pub features: Vec<f32>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlternativeBody {
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub similarity: f32,
    pub risk_score: f32,
    pub risk_delta: f32,
}

impl From<RankedAlternative> for AlternativeBody {
    fn from(alternative: RankedAlternative) -> Self {
        Self {
            item_id: alternative.item_id,
            label: alternative.label,
            similarity: alternative.similarity,
            risk_score: alternative.risk,
            risk_delta: alternative.risk_delta,
        }
    }
}

/// Body of a successful `POST /v1/score` response.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponseBody {
    pub request_id: String,
    pub risk_score: f32,
    pub model_version: String,
    pub action_triggered: bool,
    pub alternatives: Vec<AlternativeBody>,
    pub cached: bool,
}

impl From<ScoreOutcome> for ScoreResponseBody {
    fn from(outcome: ScoreOutcome) -> Self {
        Self {
            request_id: outcome.request_id.to_string(),
            risk_score: outcome.risk.value,
            model_version: outcome.risk.model_version,
            action_triggered: outcome.action_triggered,
            alternatives: outcome
                .alternatives
                .into_iter()
                .map(AlternativeBody::from)
                .collect(),
            cached: outcome.cached,
        }
    }
}

/// Body of `GET /v1/catalog/stats` (admin only).
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStatsBody {
    pub entries: usize,
    pub embedding_dim: usize,
    pub risk_min: f32,
    pub risk_mean: f32,
    pub risk_max: f32,
}

impl From<detour::CatalogStats> for CatalogStatsBody {
    fn from(stats: detour::CatalogStats) -> Self {
        Self {
            entries: stats.entries,
            embedding_dim: stats.embedding_dim,
            risk_min: stats.risk_min,
            risk_mean: stats.risk_mean,
            risk_max: stats.risk_max,
        }
    }
}
