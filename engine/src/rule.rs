//! Targeting rules and first-match-wins rule selection.

use crate::{error::Result, EvaluationContext, FlagConfig, RuleCondition, RuleId, VariationId};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// What a matching rule serves.
///
/// Flattened into the rule on the wire: a rule carries exactly one of a
/// `variationId` or a `rollout` map of variation id to weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RuleOutcome {
    /// Serve one variation directly
    Variation {
        #[serde(rename = "variationId")]
        variation_id: VariationId,
    },
    /// Split traffic by weight (percentage points, summing to 100)
    Rollout { rollout: BTreeMap<VariationId, u32> },
}

/// Wire shape before the one-of check.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOutcome {
    variation_id: Option<VariationId>,
    rollout: Option<BTreeMap<VariationId, u32>>,
}

impl<'de> Deserialize<'de> for RuleOutcome {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawOutcome::deserialize(deserializer)?;
        match (raw.variation_id, raw.rollout) {
            (Some(variation_id), None) => Ok(RuleOutcome::Variation { variation_id }),
            (None, Some(rollout)) => Ok(RuleOutcome::Rollout { rollout }),
            (Some(_), Some(_)) => Err(de::Error::custom(
                "rule has both `variationId` and `rollout`, expected exactly one",
            )),
            (None, None) => Err(de::Error::custom(
                "rule has neither `variationId` nor `rollout`",
            )),
        }
    }
}

impl RuleOutcome {
    /// Variation ids this outcome can serve.
    pub fn variation_ids(&self) -> Vec<&VariationId> {
        match self {
            RuleOutcome::Variation { variation_id } => vec![variation_id],
            RuleOutcome::Rollout { rollout } => rollout.keys().collect(),
        }
    }
}

/// A targeting rule: conditions ANDed together plus an outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRule {
    /// Rule ID, part of the rollout bucketing seed
    pub id: RuleId,
    /// Conditions; an empty list matches everyone
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    /// Outcome when every condition matches
    #[serde(flatten)]
    pub outcome: RuleOutcome,
}

impl EngineRule {
    /// Create a rule that serves one variation.
    pub fn serve(id: impl Into<RuleId>, variation_id: impl Into<VariationId>) -> Self {
        Self {
            id: id.into(),
            conditions: Vec::new(),
            outcome: RuleOutcome::Variation {
                variation_id: variation_id.into(),
            },
        }
    }

    /// Create a rule that splits traffic by weight.
    pub fn rollout<I, K>(id: impl Into<RuleId>, weights: I) -> Self
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<VariationId>,
    {
        Self {
            id: id.into(),
            conditions: Vec::new(),
            outcome: RuleOutcome::Rollout {
                rollout: weights.into_iter().map(|(k, w)| (k.into(), w)).collect(),
            },
        }
    }

    /// Builder-style method to add a condition.
    pub fn with_condition(mut self, condition: RuleCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// A rule matches iff every one of its conditions matches.
    pub fn matches(&self, context: &EvaluationContext) -> Result<bool> {
        for condition in &self.conditions {
            if !condition.matches(context)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Result of rule selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    /// The first rule whose conditions all matched
    Rule(&'a EngineRule),
    /// Disabled flag, or no rule matched
    Default,
}

/// Walk the flag's rules in order and return the first full match.
///
/// A disabled flag short-circuits to [`Selection::Default`] without looking
/// at any rule.
pub fn select_rule<'a>(flag: &'a FlagConfig, context: &EvaluationContext) -> Result<Selection<'a>> {
    if !flag.enabled {
        tracing::debug!(flag = %flag.key, "flag disabled, skipping rules");
        return Ok(Selection::Default);
    }

    for rule in &flag.rules {
        if rule.matches(context)? {
            tracing::debug!(flag = %flag.key, rule = %rule.id, "rule matched");
            return Ok(Selection::Rule(rule));
        }
    }

    tracing::trace!(flag = %flag.key, "no rule matched");
    Ok(Selection::Default)
}
