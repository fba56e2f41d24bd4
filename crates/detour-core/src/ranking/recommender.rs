use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::catalog::AlternativesCatalog;
use crate::index::NearestNeighbors;

use super::error::RankingError;
use super::types::{RankedAlternative, RankingParams};

/// Retrieval and ranking over the shared catalog and index.
pub struct Recommender<N> {
    index: Arc<N>,
    catalog: Arc<AlternativesCatalog>,
    params: RankingParams,
}

impl<N> std::fmt::Debug for Recommender<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recommender")
            .field("catalog_entries", &self.catalog.len())
            .field("params", &self.params)
            .finish()
    }
}

impl<N: NearestNeighbors> Recommender<N> {
    pub fn new(index: Arc<N>, catalog: Arc<AlternativesCatalog>, params: RankingParams) -> Self {
        Self {
            index,
            catalog,
            params,
        }
    }

    pub fn params(&self) -> &RankingParams {
        &self.params
    }

    /// Returns up to `k` lower-risk alternatives for the query, ranked by
    /// the combined similarity/risk-reduction score. An empty result is a
    /// valid outcome, not an error.
    pub fn recommend(
        &self,
        query_embedding: &[f32],
        query_risk: f32,
        k: usize,
    ) -> Result<Vec<RankedAlternative>, RankingError> {
        if k == 0 {
            return Err(RankingError::InvalidTopK { requested: k });
        }
        if !query_risk.is_finite() || !(0.0..=1.0).contains(&query_risk) {
            return Err(RankingError::InvalidRisk { value: query_risk });
        }

        let m = k.saturating_mul(self.params.overfetch_factor).max(k);
        let neighbors = self.index.search(query_embedding, m)?;

        let risk_ceiling = query_risk - self.params.risk_margin;

        let mut ranked: Vec<RankedAlternative> = neighbors
            .into_iter()
            .filter_map(|neighbor| {
                let entry = self.catalog.get(neighbor.position)?;
                if entry.risk > risk_ceiling {
                    return None;
                }
                let risk_delta = query_risk - entry.risk;
                Some(RankedAlternative {
                    position: neighbor.position,
                    item_id: entry.item_id.clone(),
                    label: entry.label.clone(),
                    similarity: neighbor.similarity,
                    risk: entry.risk,
                    risk_delta,
                    combined: self.params.weight_similarity * neighbor.similarity
                        + self.params.weight_risk * risk_delta,
                })
            })
            .collect();

        ranked.sort_by(compare_ranked);

        // Duplicate item ids can appear in the catalog; keep the best-ranked.
        let mut seen: HashSet<&str> = HashSet::with_capacity(ranked.len());
        let mut deduped = Vec::with_capacity(k.min(ranked.len()));
        for alternative in &ranked {
            if seen.insert(alternative.item_id.as_str()) {
                deduped.push(alternative.clone());
                if deduped.len() == k {
                    break;
                }
            }
        }

        debug!(
            query_risk,
            k,
            overfetched = m,
            returned = deduped.len(),
            "Ranked alternatives"
        );

        Ok(deduped)
    }
}

/// Descending combined score, then lower candidate risk, then stable
/// catalog order.
fn compare_ranked(a: &RankedAlternative, b: &RankedAlternative) -> Ordering {
    b.combined
        .total_cmp(&a.combined)
        .then_with(|| a.risk.total_cmp(&b.risk))
        .then_with(|| a.position.cmp(&b.position))
}
