//! Unified error handling for the server.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] switchyard_engine::Error),

    #[error("Invalid request body: {0}")]
    InvalidInput(#[from] JsonRejection),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, kind) = match &self {
            AppError::Engine(e) if e.is_config_error() => {
                tracing::warn!("Flag configuration error: {}", e);
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), Some(e.kind()))
            }
            AppError::Engine(e) => {
                tracing::debug!("Evaluation input error: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string(), Some(e.kind()))
            }
            AppError::InvalidInput(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                (rejection.status(), rejection.body_text(), Some("invalid_input"))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            kind,
        });

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
