use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, instrument, warn};

use detour::index::NearestNeighbors;
use detour::{CancelToken, Deadline, EngineError, Principal, ScoreRequest};

use crate::gateway::DETOUR_STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{CatalogStatsBody, ScoreRequestBody, ScoreResponseBody};
use crate::gateway::state::HandlerState;

/// Cancels the engine-side token when the handler future is dropped
/// (client disconnect) so abandoned work stops at the next checkpoint.
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[instrument(skip(state, headers, request))]
pub async fn score_handler<N>(
    State(state): State<HandlerState<N>>,
    headers: HeaderMap,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    N: NearestNeighbors + Send + Sync + 'static,
{
    // Auth comes first: an invalid credential is rejected before the
    // body is even inspected.
    let principal = authorize(&state, &headers)?;
    debug!(principal = %principal.name, "Scoring request authorized");

    let body: ScoreRequestBody = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid request schema: {}", e)))?;

    let score_request = ScoreRequest {
        item_id: body.item_id,
        features: body.features,
        top_k: body.top_k,
    };

    let deadline = Deadline::after(state.request_timeout);
    let cancel = CancelToken::new();
    let _guard = CancelOnDrop(cancel.clone());

    let engine = state.engine.clone();
    let worker_cancel = cancel.clone();
    let work = tokio::task::spawn_blocking(move || {
        engine.handle(&score_request, &deadline, &worker_cancel)
    });

    let outcome = match tokio::time::timeout(state.request_timeout, work).await {
        Err(_) => {
            cancel.cancel();
            return Err(GatewayError::Timeout);
        }
        Ok(Err(join_err)) => {
            error!("Scoring task failed: {}", join_err);
            return Err(GatewayError::InternalError);
        }
        Ok(Ok(Err(e))) => {
            if matches!(e, EngineError::InternalError { .. }) {
                error!("Scoring pipeline failed: {}", e);
            }
            return Err(e.into());
        }
        Ok(Ok(Ok(outcome))) => outcome,
    };

    let status = if outcome.cached { "cached" } else { "scored" };
    let mut response_headers = HeaderMap::new();
    response_headers.insert(DETOUR_STATUS_HEADER, HeaderValue::from_static(status));

    Ok((
        StatusCode::OK,
        response_headers,
        Json(ScoreResponseBody::from(outcome)),
    )
        .into_response())
}

#[instrument(skip(state, headers))]
pub async fn catalog_stats_handler<N>(
    State(state): State<HandlerState<N>>,
    headers: HeaderMap,
) -> Result<Response, GatewayError>
where
    N: NearestNeighbors + Send + Sync + 'static,
{
    let principal = authorize(&state, &headers)?;
    if !principal.is_admin() {
        warn!(principal = %principal.name, "Catalog stats denied for non-admin");
        return Err(GatewayError::Forbidden);
    }

    let stats = CatalogStatsBody::from(state.engine.catalog_stats());
    Ok((StatusCode::OK, Json(stats)).into_response())
}

fn authorize<N>(
    state: &HandlerState<N>,
    headers: &HeaderMap,
) -> Result<Principal, GatewayError>
where
    N: NearestNeighbors + Send + Sync + 'static,
{
    let credential = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|val| val.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or(GatewayError::MissingCredential)?;

    state.trust_store.authorize(credential).map_err(|e| {
        if e.is_unauthorized() {
            GatewayError::Unauthorized
        } else {
            error!("Trust store failure during authorization: {}", e);
            GatewayError::InternalError
        }
    })
}
