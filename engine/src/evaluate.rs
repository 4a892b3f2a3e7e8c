//! Flag evaluation: rule selection, variation selection and value coercion.

use crate::{
    bucket, error::Result, resolve_identifier, rule::select_rule, ConfigError, EvaluationContext,
    FlagConfig, FlagKey, RuleId, RuleOutcome, Selection, VariationId, VariationValue,
};
use serde::{Deserialize, Serialize};

/// Why a variation was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    /// Flag kill switch is off
    Disabled,
    /// A rule with a direct variation matched
    RuleMatch,
    /// A rule with a weighted rollout matched
    Rollout,
    /// No rule matched
    Default,
}

/// A variation resolved to its typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedValue {
    pub variation_id: VariationId,
    pub value: VariationValue,
}

/// Outcome of evaluating one flag for one context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub flag_key: FlagKey,
    pub variation_id: VariationId,
    pub value: VariationValue,
    pub reason: Reason,
    /// The matched rule, when one matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<RuleId>,
}

/// Evaluate a flag for a context.
///
/// The config is validated in full first, so configuration errors surface
/// even when the broken part is not reached by this context. Callers that
/// evaluate the same config repeatedly should validate once with
/// [`FlagConfig::validated`] and evaluate through [`crate::ValidatedFlag`].
pub fn evaluate_flag(flag: &FlagConfig, context: &EvaluationContext) -> Result<EvaluationResult> {
    flag.validate()?;
    evaluate_validated(flag, context)
}

pub(crate) fn evaluate_validated(
    flag: &FlagConfig,
    context: &EvaluationContext,
) -> Result<EvaluationResult> {
    let selection = select_rule(flag, context)?;
    let resolved = resolve_value(flag, &selection, context)?;

    let (reason, rule_id) = match selection {
        Selection::Default if !flag.enabled => (Reason::Disabled, None),
        Selection::Default => (Reason::Default, None),
        Selection::Rule(rule) => match rule.outcome {
            RuleOutcome::Variation { .. } => (Reason::RuleMatch, Some(rule.id.clone())),
            RuleOutcome::Rollout { .. } => (Reason::Rollout, Some(rule.id.clone())),
        },
    };

    tracing::debug!(
        flag = %flag.key,
        variation = %resolved.variation_id,
        ?reason,
        "flag evaluated"
    );

    Ok(EvaluationResult {
        flag_key: flag.key.clone(),
        variation_id: resolved.variation_id,
        value: resolved.value,
        reason,
        rule_id,
    })
}

/// Turn a rule selection into a concrete typed value.
///
/// Rollouts bucket on the resolved identifier, so a context without one
/// fails here with [`crate::Error::MissingIdentifier`].
pub fn resolve_value(
    flag: &FlagConfig,
    selection: &Selection<'_>,
    context: &EvaluationContext,
) -> Result<ResolvedValue> {
    let variation_id = match selection {
        Selection::Default => &flag.default_variation_id,
        Selection::Rule(rule) => match &rule.outcome {
            RuleOutcome::Variation { variation_id } => variation_id,
            RuleOutcome::Rollout { rollout } => {
                let identifier = resolve_identifier(context)?;
                let bucket = bucket::bucket_for(&identifier, flag.salt(), &rule.id);
                tracing::trace!(flag = %flag.key, rule = %rule.id, bucket, "bucketed identifier");
                bucket::select_weighted(rollout, bucket).ok_or_else(|| {
                    ConfigError::InvalidWeights {
                        rule: rule.id.clone(),
                        total: rollout.values().map(|w| u64::from(*w)).sum(),
                    }
                })?
            }
        },
    };

    let variation = flag
        .variation(variation_id)
        .ok_or_else(|| ConfigError::UnknownVariation {
            variation: variation_id.clone(),
            referrer: format!("flag '{}'", flag.key),
        })?;
    variation.check_type()?;

    Ok(ResolvedValue {
        variation_id: variation.id.clone(),
        value: variation.value.clone(),
    })
}
