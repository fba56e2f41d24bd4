//! HTTP gateway (Axum) for risk scoring and alternative retrieval.
//!
//! This module is primarily used by the `detour` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use handler::{catalog_stats_handler, score_handler};
pub use state::HandlerState;

use detour::index::NearestNeighbors;

/// Response header carrying the gateway's verdict for the request.
pub const DETOUR_STATUS_HEADER: &str = "x-detour-status";

pub fn create_router_with_state<N>(state: HandlerState<N>) -> Router
where
    N: NearestNeighbors + Send + Sync + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/v1/score", post(score_handler))
        .route("/v1/catalog/stats", get(catalog_stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub model: String,
    pub catalog_entries: usize,
    pub trust_store_entries: usize,
}

/// Liveness: the router only exists after every shared structure loaded,
/// so a reachable process is a healthy one.
#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(DETOUR_STATUS_HEADER, HeaderValue::from_static("healthy"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<N>(State(state): State<HandlerState<N>>) -> Response
where
    N: NearestNeighbors + Send + Sync + 'static,
{
    let components = ComponentStatus {
        http: "ready",
        model: state.engine.model_version().to_string(),
        catalog_entries: state.engine.catalog_len(),
        trust_store_entries: state.trust_store.len(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(DETOUR_STATUS_HEADER, HeaderValue::from_static("ready"));

    (
        StatusCode::OK,
        headers,
        Json(ReadyResponse {
            status: "ok",
            components,
        }),
    )
        .into_response()
}
