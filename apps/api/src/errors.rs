use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analyzer::{AnalyzeError, ErrorKind};
use crate::embedding::EmbedError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Analysis error: {0}")]
    Analyzer(#[from] AnalyzeError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbedError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Analyzer(e) => {
                if e.kind.is_retryable() {
                    tracing::warn!("Analyzer error (retryable): {e}");
                } else {
                    tracing::error!("Analyzer error: {e}");
                }
                (analyzer_status(e.kind), "ANALYZER_ERROR", e.to_string())
            }
            AppError::Embedding(e) => {
                tracing::error!("Embedding error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EMBEDDING_ERROR",
                    "Failed to compute an embedding for the request".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Explicit-mode analyzer failures surface with a status operators can
/// act on: auth and parse problems point at configuration, the retryable
/// kinds at the backend.
fn analyzer_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::AuthError | ErrorKind::ParseError => StatusCode::BAD_GATEWAY,
        ErrorKind::RateLimited | ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
