//! Flag configuration and validation.
//!
//! A [`FlagConfig`] is the serialization contract between the storage layer
//! and every SDK. The engine only ever reads it.

use crate::{
    error::Result, ConfigError, EngineRule, Error, EvaluationContext, EvaluationResult, FlagKey,
    RuleOutcome, VariationId, VariationTypeLabel, VariationValue,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One concrete typed value a flag can resolve to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagVariation {
    /// Unique within the flag
    pub id: VariationId,
    /// Human label
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub variation_type: VariationTypeLabel,
    /// Must conform to `variation_type`
    pub value: VariationValue,
}

impl FlagVariation {
    /// Create a variation whose declared type is inferred from the value.
    pub fn new(id: impl Into<VariationId>, value: VariationValue) -> Self {
        let variation_type = match &value {
            VariationValue::Boolean(_) => VariationTypeLabel::Boolean,
            VariationValue::Number(_) => VariationTypeLabel::Number,
            VariationValue::String(_) => VariationTypeLabel::String,
            VariationValue::Json(_) => VariationTypeLabel::Json,
        };
        Self::typed(id, variation_type, value)
    }

    /// Create a variation with an explicit declared type.
    pub fn typed(
        id: impl Into<VariationId>,
        variation_type: VariationTypeLabel,
        value: VariationValue,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            variation_type,
            value,
        }
    }

    /// Builder-style method to set the label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check the stored value against the declared type.
    pub fn check_type(&self) -> Result<()> {
        if self.value.conforms_to(self.variation_type) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                variation: self.id.clone(),
                expected: self.variation_type.to_string(),
                got: self.value.type_name().to_string(),
            })
        }
    }
}

/// Immutable snapshot of one flag's targeting policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagConfig {
    /// Unique flag key
    pub key: FlagKey,
    /// Kill switch; a disabled flag always serves the default
    pub enabled: bool,
    /// Possible values, at least one
    pub variations: Vec<FlagVariation>,
    /// Evaluated in order, first match wins
    #[serde(default)]
    pub rules: Vec<EngineRule>,
    /// Served when the flag is disabled or no rule matches
    pub default_variation_id: VariationId,
    /// Bucketing salt; falls back to `key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollout_salt: Option<String>,
}

impl FlagConfig {
    /// Create an enabled flag with no rules.
    pub fn new(
        key: impl Into<FlagKey>,
        variations: Vec<FlagVariation>,
        default_variation_id: impl Into<VariationId>,
    ) -> Self {
        Self {
            key: key.into(),
            enabled: true,
            variations,
            rules: Vec::new(),
            default_variation_id: default_variation_id.into(),
            rollout_salt: None,
        }
    }

    /// Builder-style method to append a rule.
    pub fn with_rule(mut self, rule: EngineRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Builder-style method to append several rules.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = EngineRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Builder-style method to set the rollout salt.
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.rollout_salt = Some(salt.into());
        self
    }

    /// The salt mixed into rollout buckets.
    pub fn salt(&self) -> &str {
        self.rollout_salt.as_deref().unwrap_or(&self.key)
    }

    /// Get a variation by ID.
    pub fn variation(&self, id: &str) -> Option<&FlagVariation> {
        self.variations.iter().find(|v| v.id == id)
    }

    /// Check every structural invariant of the config.
    ///
    /// This compiles every regex and parses every semver operand, so it is
    /// meant to run once when a config is loaded rather than per request.
    pub fn validate(&self) -> Result<()> {
        if self.variations.is_empty() {
            return Err(ConfigError::NoVariations(self.key.clone()).into());
        }

        let mut variation_ids = HashSet::with_capacity(self.variations.len());
        for variation in &self.variations {
            if !variation_ids.insert(variation.id.as_str()) {
                return Err(ConfigError::DuplicateVariation(variation.id.clone()).into());
            }
            variation.check_type()?;
        }

        if !variation_ids.contains(self.default_variation_id.as_str()) {
            return Err(ConfigError::UnknownVariation {
                variation: self.default_variation_id.clone(),
                referrer: "defaultVariationId".to_string(),
            }
            .into());
        }

        let mut rule_ids = HashSet::with_capacity(self.rules.len());
        for rule in &self.rules {
            if rule.id.is_empty() {
                return Err(ConfigError::EmptyRuleId.into());
            }
            if !rule_ids.insert(rule.id.as_str()) {
                return Err(ConfigError::DuplicateRule(rule.id.clone()).into());
            }

            for variation in rule.outcome.variation_ids() {
                if !variation_ids.contains(variation.as_str()) {
                    return Err(ConfigError::UnknownVariation {
                        variation: variation.clone(),
                        referrer: format!("rule '{}'", rule.id),
                    }
                    .into());
                }
            }

            if let RuleOutcome::Rollout { rollout } = &rule.outcome {
                if rollout.is_empty() {
                    return Err(ConfigError::EmptyRollout(rule.id.clone()).into());
                }
                let total: u64 = rollout.values().map(|w| u64::from(*w)).sum();
                if total != 100 {
                    return Err(ConfigError::InvalidWeights {
                        rule: rule.id.clone(),
                        total,
                    }
                    .into());
                }
            }

            for condition in &rule.conditions {
                condition.validate()?;
            }
        }

        Ok(())
    }

    /// Validate once and keep the proof alongside the config.
    pub fn validated(self) -> Result<ValidatedFlag> {
        self.validate()?;
        Ok(ValidatedFlag { config: self })
    }
}

/// A [`FlagConfig`] that has passed [`FlagConfig::validate`].
///
/// Evaluating through this type skips re-validation, for callers that load a
/// config once and evaluate it many times.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFlag {
    config: FlagConfig,
}

impl ValidatedFlag {
    pub fn config(&self) -> &FlagConfig {
        &self.config
    }

    pub fn key(&self) -> &str {
        &self.config.key
    }

    pub fn into_inner(self) -> FlagConfig {
        self.config
    }

    /// Evaluate the flag for a context.
    pub fn evaluate(&self, context: &EvaluationContext) -> Result<EvaluationResult> {
        crate::evaluate::evaluate_validated(&self.config, context)
    }
}
