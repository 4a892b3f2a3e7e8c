//! Evaluation endpoint routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use switchyard_engine::EvaluationResult;

use crate::error::Result;
use crate::handlers::{
    handle_evaluate, handle_evaluate_preloaded, handle_identifier, handle_list_flags,
    handle_validate, ContextRequest, EvaluateRequest, FlagKeysResponse, IdentifierResponse,
    ValidateRequest, ValidateResponse,
};
use crate::AppState;

/// Create evaluation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/evaluate", post(evaluate_handler))
        .route("/v1/validate", post(validate_handler))
        .route("/v1/identifier", post(identifier_handler))
        .route("/v1/flags", get(list_flags_handler))
        .route("/v1/flags/{key}/evaluate", post(evaluate_preloaded_handler))
}

/// Body extractor whose rejection is turned into an `AppError`.
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// POST /v1/evaluate - Evaluate a flag config sent with the request.
async fn evaluate_handler(body: JsonBody<EvaluateRequest>) -> Result<Json<EvaluationResult>> {
    let Json(request) = body?;
    Ok(Json(handle_evaluate(request)?))
}

/// POST /v1/validate - Validate a flag config.
async fn validate_handler(body: JsonBody<ValidateRequest>) -> Result<Json<ValidateResponse>> {
    let Json(request) = body?;
    Ok(Json(handle_validate(request)?))
}

/// POST /v1/identifier - Resolve the bucketing identifier for a context.
async fn identifier_handler(body: JsonBody<ContextRequest>) -> Result<Json<IdentifierResponse>> {
    let Json(request) = body?;
    Ok(Json(handle_identifier(request)?))
}

/// GET /v1/flags - List preloaded flag keys.
async fn list_flags_handler(State(state): State<AppState>) -> Json<FlagKeysResponse> {
    Json(handle_list_flags(&state.registry))
}

/// POST /v1/flags/{key}/evaluate - Evaluate a preloaded flag.
async fn evaluate_preloaded_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: JsonBody<ContextRequest>,
) -> Result<Json<EvaluationResult>> {
    let Json(request) = body?;
    Ok(Json(handle_evaluate_preloaded(
        &state.registry,
        &key,
        request,
    )?))
}
