/// Tunables for retrieval and ranking, fixed at startup.
#[derive(Debug, Clone)]
pub struct RankingParams {
    /// Minimum risk improvement a candidate must offer over the query.
    pub risk_margin: f32,

    /// Overfetch multiplier: the index is asked for `k * factor`
    /// candidates so the margin filter still leaves enough survivors.
    pub overfetch_factor: usize,

    /// Weight of embedding similarity in the combined score.
    pub weight_similarity: f32,

    /// Weight of risk reduction in the combined score.
    pub weight_risk: f32,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            risk_margin: 0.1,
            overfetch_factor: 4,
            weight_similarity: 0.5,
            weight_risk: 0.5,
        }
    }
}

/// One ranked alternative returned to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedAlternative {
    /// Stable catalog position of the item.
    pub position: usize,
    pub item_id: String,
    pub label: Option<String>,
    /// Embedding similarity to the query, in `[0, 1]`.
    pub similarity: f32,
    /// The candidate's precomputed risk.
    pub risk: f32,
    /// Risk improvement over the query item (always >= the margin).
    pub risk_delta: f32,
    /// `w1 * similarity + w2 * risk_delta`; the sort key.
    pub combined: f32,
}
