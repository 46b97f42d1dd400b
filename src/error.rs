//! HTTP error surface.
//!
//! Every request either fully succeeds or fails with one typed cause; no
//! errors are retried internally. Service-layer errors are folded into
//! [`ApiError`] kinds here and rendered as a JSON body.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::Serialize;

use crate::{
    query::QueryError,
    services::{IngestError, StatsError},
};

/// JSON body returned for all error responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub error: String,
}

/// Request-terminal errors surfaced by the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Ingestion(String),

    #[error("{0}")]
    QueryTimeout(String),

    #[error("{0}")]
    QueryFailed(String),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Invalid(e) => ApiError::InvalidInput(e.to_string()),
            IngestError::Encode(e) => ApiError::Ingestion(e.to_string()),
            IngestError::Stream(e) => ApiError::Ingestion(e.to_string()),
        }
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::Query(QueryError::Timeout(_)) => ApiError::QueryTimeout(err.to_string()),
            _ => ApiError::QueryFailed(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg),
            ApiError::Ingestion(msg) => {
                tracing::error!(error = %msg, "ingestion failed");
                (StatusCode::BAD_GATEWAY, "ingestion_failed", msg)
            }
            ApiError::QueryTimeout(msg) => {
                tracing::error!(error = %msg, "billing query timed out");
                (StatusCode::GATEWAY_TIMEOUT, "query_timeout", msg)
            }
            ApiError::QueryFailed(msg) => {
                tracing::error!(error = %msg, "billing query failed");
                (StatusCode::BAD_GATEWAY, "query_failed", msg)
            }
        };

        (status, Json(ErrorResponse { code, error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvalidEvent;

    #[test]
    fn test_invalid_event_maps_to_invalid_input() {
        let api: ApiError = IngestError::Invalid(InvalidEvent::ZeroQuantity).into();
        assert!(matches!(api, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_timeout_maps_to_distinct_kind() {
        let api: ApiError =
            StatsError::Query(QueryError::Timeout(std::time::Duration::from_secs(60))).into();
        assert!(matches!(api, ApiError::QueryTimeout(_)));

        let api: ApiError = StatsError::Query(QueryError::Failed {
            status: "FAILED".to_string(),
        })
        .into();
        assert!(matches!(api, ApiError::QueryFailed(_)));
    }
}
