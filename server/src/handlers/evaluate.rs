//! Evaluation handlers - run the engine on request payloads.

use crate::error::{AppError, Result};
use crate::registry::FlagRegistry;
use serde::{Deserialize, Serialize};
use switchyard_engine::{
    evaluate_flag, resolve_identifier, EvaluationContext, EvaluationResult, FlagConfig,
};

/// Request body for ad-hoc evaluation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    /// Flag config to evaluate
    pub flag: FlagConfig,
    /// Evaluation context
    pub context: EvaluationContext,
}

/// Request body for evaluating a preloaded flag.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRequest {
    pub context: EvaluationContext,
}

/// Request body for validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub flag: FlagConfig,
}

/// Response for a successful validation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    pub flag_key: String,
}

/// Response for identifier resolution.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierResponse {
    pub identifier: String,
}

/// Response listing preloaded flag keys.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagKeysResponse {
    pub keys: Vec<String>,
}

/// Evaluate a flag config supplied in the request.
pub fn handle_evaluate(request: EvaluateRequest) -> Result<EvaluationResult> {
    let result = evaluate_flag(&request.flag, &request.context)?;
    Ok(result)
}

/// Evaluate a flag loaded at startup.
pub fn handle_evaluate_preloaded(
    registry: &FlagRegistry,
    key: &str,
    request: ContextRequest,
) -> Result<EvaluationResult> {
    let flag = registry
        .get(key)
        .ok_or_else(|| AppError::NotFound(format!("flag '{}'", key)))?;
    Ok(flag.evaluate(&request.context)?)
}

/// Validate a flag config without evaluating it.
pub fn handle_validate(request: ValidateRequest) -> Result<ValidateResponse> {
    request.flag.validate()?;
    Ok(ValidateResponse {
        valid: true,
        flag_key: request.flag.key,
    })
}

/// Resolve the bucketing identifier for a context.
pub fn handle_identifier(request: ContextRequest) -> Result<IdentifierResponse> {
    let identifier = resolve_identifier(&request.context)?;
    Ok(IdentifierResponse { identifier })
}

/// List keys of preloaded flags.
pub fn handle_list_flags(registry: &FlagRegistry) -> FlagKeysResponse {
    FlagKeysResponse {
        keys: registry.keys().into_iter().map(str::to_string).collect(),
    }
}
