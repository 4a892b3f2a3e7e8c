//! Targeting conditions and the operators that evaluate them.
//!
//! A condition reads one attribute from the [`EvaluationContext`] and compares
//! it to an operand. Every comparison is total: a missing attribute, a type
//! mismatch or a malformed operand simply does not match. The exceptions are
//! operands that can only be authoring mistakes (a regex that does not compile,
//! a semver operand that does not parse), which surface as [`ConfigError`]s.

use crate::{
    context::AttributeValue, error::Result, semver::SemVer, ConfigError, EvaluationContext,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Comparison operators. The set is versioned with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Contains,
    GreaterThan,
    LessThan,
    MatchesRegex,
    SemverGreaterThan,
    SemverLessThan,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Contains => "contains",
            Operator::GreaterThan => "greaterThan",
            Operator::LessThan => "lessThan",
            Operator::MatchesRegex => "matchesRegex",
            Operator::SemverGreaterThan => "semverGreaterThan",
            Operator::SemverLessThan => "semverLessThan",
        };
        f.write_str(name)
    }
}

/// A single targeting condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    /// Attribute to read from the context
    pub attribute: String,
    /// Comparison operator
    pub operator: Operator,
    /// Operand; its expected shape depends on the operator
    pub value: serde_json::Value,
}

impl RuleCondition {
    /// Create a new condition.
    pub fn new(
        attribute: impl Into<String>,
        operator: Operator,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }

    /// Check the operand for authoring mistakes without evaluating anything.
    pub fn validate(&self) -> Result<()> {
        match self.operator {
            Operator::MatchesRegex => self.compile_regex().map(|_| ()),
            Operator::SemverGreaterThan | Operator::SemverLessThan => {
                self.semver_operand().map(|_| ())
            }
            _ => Ok(()),
        }
    }

    /// Evaluate the condition against a context.
    pub fn matches(&self, context: &EvaluationContext) -> Result<bool> {
        // Operands are checked before the attribute so bad patterns surface
        // even for contexts that lack the attribute.
        match self.operator {
            Operator::MatchesRegex => {
                let Some(regex) = self.compile_regex()? else {
                    return Ok(false);
                };
                let attr = context.attribute(&self.attribute);
                Ok(attr
                    .as_ref()
                    .and_then(AttributeValue::as_str)
                    .is_some_and(|s| regex.is_match(s)))
            }
            Operator::SemverGreaterThan | Operator::SemverLessThan => {
                let Some(operand) = self.semver_operand()? else {
                    return Ok(false);
                };
                let wanted = if self.operator == Operator::SemverGreaterThan {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
                let attr = context.attribute(&self.attribute);
                Ok(attr
                    .as_ref()
                    .and_then(AttributeValue::as_str)
                    .and_then(SemVer::parse)
                    .is_some_and(|version| version.cmp(&operand) == wanted))
            }
            _ => Ok(context
                .attribute(&self.attribute)
                .is_some_and(|attr| self.compare(&attr))),
        }
    }

    fn compare(&self, attr: &AttributeValue) -> bool {
        match self.operator {
            Operator::Equals => attr.equals_json(&self.value),
            Operator::NotEquals => !attr.equals_json(&self.value),
            Operator::In => self
                .value
                .as_array()
                .is_some_and(|items| items.iter().any(|item| attr.equals_json(item))),
            Operator::NotIn => self
                .value
                .as_array()
                .is_some_and(|items| !items.iter().any(|item| attr.equals_json(item))),
            Operator::Contains => match (attr.as_str(), self.value.as_str()) {
                (Some(haystack), Some(needle)) => haystack.contains(needle),
                _ => false,
            },
            Operator::GreaterThan => self.numeric(attr).is_some_and(|(a, b)| a > b),
            Operator::LessThan => self.numeric(attr).is_some_and(|(a, b)| a < b),
            Operator::MatchesRegex | Operator::SemverGreaterThan | Operator::SemverLessThan => {
                false
            }
        }
    }

    fn numeric(&self, attr: &AttributeValue) -> Option<(f64, f64)> {
        Some((attr.as_f64()?, self.value.as_f64()?))
    }

    /// `Ok(None)` when the operand is not a string at all.
    fn compile_regex(&self) -> Result<Option<Regex>> {
        let Some(pattern) = self.value.as_str() else {
            return Ok(None);
        };
        Regex::new(pattern).map(Some).map_err(|e| {
            ConfigError::InvalidRegex {
                attribute: self.attribute.clone(),
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// `Ok(None)` when the operand is not a string at all.
    fn semver_operand(&self) -> Result<Option<SemVer>> {
        let Some(operand) = self.value.as_str() else {
            return Ok(None);
        };
        SemVer::parse(operand).map(Some).ok_or_else(|| {
            ConfigError::InvalidSemver {
                attribute: self.attribute.clone(),
                operand: operand.to_string(),
            }
            .into()
        })
    }
}
