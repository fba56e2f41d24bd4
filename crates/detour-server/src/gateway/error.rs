use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use detour::EngineError;

use super::DETOUR_STATUS_HEADER;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("missing credential: expected 'Authorization: Bearer <key>'")]
    MissingCredential,

    #[error("invalid credentials")]
    Unauthorized,

    #[error("admin role required")]
    Forbidden,

    #[error("request deadline exceeded")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,

    #[error("internal error")]
    InternalError,
}

impl From<EngineError> for GatewayError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::InvalidInput { reason } => GatewayError::InvalidRequest(reason),
            EngineError::Timeout => GatewayError::Timeout,
            EngineError::Cancelled => GatewayError::Cancelled,
            EngineError::DimensionMismatch { .. } | EngineError::InternalError { .. } => {
                // Details are logged where they occur; the caller gets a
                // generic failure.
                GatewayError::InternalError
            }
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, detour_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::MissingCredential => (StatusCode::UNAUTHORIZED, "missing_credential"),
            GatewayError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            GatewayError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            GatewayError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            GatewayError::Cancelled => (StatusCode::INTERNAL_SERVER_ERROR, "cancelled"),
            GatewayError::InternalError => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            DETOUR_STATUS_HEADER,
            HeaderValue::from_str(detour_status).unwrap_or(HeaderValue::from_static("error")),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
