//! Request orchestrator.
//!
//! Owns the immutable per-process context (model, catalog, index,
//! response cache) and drives the per-request pipeline: validate →
//! score → threshold gate → retrieve → assemble. The deadline and
//! cancellation token are checked between the scoring and retrieval
//! steps so abandoned requests stop consuming index-query time.

pub mod error;
pub mod types;


pub use error::EngineError;
pub use types::{CancelToken, Deadline, ScoreOutcome, ScoreRequest};

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::ResponseCache;
use crate::catalog::{AlternativesCatalog, CatalogStats};
use crate::config::Config;
use crate::hashing::hash_request;
use crate::index::{NearestNeighbors, VectorIndex};
use crate::model::{ModelError, RiskModel};
use crate::ranking::{RankingError, RankingParams, Recommender};

use types::CachedOutcome;

/// Orchestrator tunables, fixed at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Risk level at or above which alternatives are retrieved.
    pub action_threshold: f32,
    /// Recommendation length when the request does not ask for one.
    pub default_top_k: usize,
    /// Hard cap on the per-request `top_k`.
    pub max_top_k: usize,
    pub ranking: RankingParams,
    /// Response cache entries; `0` disables caching.
    pub cache_capacity: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            action_threshold: 0.5,
            default_top_k: 5,
            max_top_k: 50,
            ranking: RankingParams::default(),
            cache_capacity: 1024,
        }
    }
}

impl EngineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            action_threshold: config.action_threshold,
            default_top_k: config.top_k,
            max_top_k: config.max_top_k,
            ranking: RankingParams {
                risk_margin: config.risk_margin,
                overfetch_factor: config.overfetch_factor,
                weight_similarity: config.weight_similarity,
                weight_risk: config.weight_risk,
            },
            cache_capacity: config.cache_capacity,
        }
    }
}

/// Immutable-after-init request context. Constructed once at startup and
/// shared read-only across all request handlers.
pub struct Engine<N = VectorIndex> {
    model: Arc<RiskModel>,
    catalog: Arc<AlternativesCatalog>,
    recommender: Recommender<N>,
    cache: ResponseCache<Arc<CachedOutcome>>,
    config: EngineConfig,
}

impl<N> std::fmt::Debug for Engine<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("model_version", &self.model.version())
            .field("catalog_entries", &self.catalog.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<N: NearestNeighbors> Engine<N> {
    /// Wires the loaded artifacts together, verifying that the model's
    /// projection and the catalog embeddings agree on dimensionality.
    pub fn new(
        model: Arc<RiskModel>,
        catalog: Arc<AlternativesCatalog>,
        index: Arc<N>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        if model.embedding_dim() != index.dim() || catalog.embedding_dim() != index.dim() {
            return Err(EngineError::DimensionMismatch {
                model: model.embedding_dim(),
                catalog: catalog.embedding_dim(),
            });
        }

        let cache = ResponseCache::with_capacity(config.cache_capacity);
        let recommender = Recommender::new(index, catalog.clone(), config.ranking.clone());

        info!(
            model_version = %model.version(),
            catalog_entries = catalog.len(),
            action_threshold = config.action_threshold,
            cache_enabled = cache.is_enabled(),
            "Engine initialized"
        );

        Ok(Self {
            model,
            catalog,
            recommender,
            cache,
            config,
        })
    }

    pub fn model_version(&self) -> &str {
        self.model.version()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog_stats(&self) -> CatalogStats {
        self.catalog.stats()
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    /// Runs the scoring pipeline for one request.
    pub fn handle(
        &self,
        request: &ScoreRequest,
        deadline: &Deadline,
        cancel: &CancelToken,
    ) -> Result<ScoreOutcome, EngineError> {
        let k = request.top_k.unwrap_or(self.config.default_top_k);
        if k == 0 || k > self.config.max_top_k {
            return Err(EngineError::InvalidInput {
                reason: format!("top_k must be between 1 and {}", self.config.max_top_k),
            });
        }

        checkpoint(deadline, cancel)?;

        let hash = hash_request(&request.features, k);
        if let Some(cached) = self.cache.lookup(&hash) {
            debug!(item_id = ?request.item_id, "Response cache hit");
            return Ok(ScoreOutcome {
                request_id: Uuid::new_v4(),
                risk: cached.risk.clone(),
                action_triggered: cached.action_triggered,
                alternatives: cached.alternatives.clone(),
                cached: true,
            });
        }

        let risk = self.model.score(&request.features).map_err(map_model_error)?;

        // Abandoned work must not reach the index query.
        checkpoint(deadline, cancel)?;

        let action_triggered = risk.value >= self.config.action_threshold;
        let alternatives = if action_triggered {
            let embedding = self
                .model
                .embed(&request.features)
                .map_err(map_model_error)?;
            self.recommender
                .recommend(&embedding, risk.value, k)
                .map_err(map_ranking_error)?
        } else {
            Vec::new()
        };

        debug!(
            item_id = ?request.item_id,
            risk = risk.value,
            action_triggered,
            alternatives = alternatives.len(),
            "Request scored"
        );

        self.cache.insert(
            hash,
            Arc::new(CachedOutcome {
                risk: risk.clone(),
                action_triggered,
                alternatives: alternatives.clone(),
            }),
        );

        Ok(ScoreOutcome {
            request_id: Uuid::new_v4(),
            risk,
            action_triggered,
            alternatives,
            cached: false,
        })
    }
}

fn checkpoint(deadline: &Deadline, cancel: &CancelToken) -> Result<(), EngineError> {
    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }
    if deadline.expired() {
        return Err(EngineError::Timeout);
    }
    Ok(())
}

fn map_model_error(e: ModelError) -> EngineError {
    if e.is_invalid_input() {
        EngineError::InvalidInput {
            reason: e.to_string(),
        }
    } else {
        EngineError::InternalError {
            reason: e.to_string(),
        }
    }
}

/// Ranking rejections at this point are orchestrator bugs, not caller
/// input: `k` was validated above and the query risk came from the model.
fn map_ranking_error(e: RankingError) -> EngineError {
    EngineError::InternalError {
        reason: e.to_string(),
    }
}
