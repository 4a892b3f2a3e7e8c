//! Error types for the Switchyard engine.
//!
//! Two classes of failure exist. Configuration errors mean the [`FlagConfig`]
//! itself is unusable and must be fixed by its author. Input errors mean the
//! config is fine but the evaluation context cannot satisfy it.
//!
//! Attribute mismatches inside condition evaluation are not errors: they
//! simply fail to match.
//!
//! [`FlagConfig`]: crate::FlagConfig

use crate::{RuleId, VariationId};
use thiserror::Error;

/// Problems with the structure or content of a flag configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("flag '{0}' has no variations")]
    NoVariations(String),

    #[error("duplicate variation id: {0}")]
    DuplicateVariation(VariationId),

    #[error("unknown variation '{variation}' referenced by {referrer}")]
    UnknownVariation {
        variation: VariationId,
        referrer: String,
    },

    #[error("rule id must not be empty")]
    EmptyRuleId,

    #[error("duplicate rule id: {0}")]
    DuplicateRule(RuleId),

    #[error("rollout in rule '{rule}' has weights summing to {total}, expected 100")]
    InvalidWeights { rule: RuleId, total: u64 },

    #[error("rollout in rule '{0}' has no variations")]
    EmptyRollout(RuleId),

    #[error("invalid regex '{pattern}' for attribute '{attribute}': {reason}")]
    InvalidRegex {
        attribute: String,
        pattern: String,
        reason: String,
    },

    #[error("invalid semantic version operand for attribute '{attribute}': {operand}")]
    InvalidSemver { attribute: String, operand: String },
}

/// All possible errors from the Switchyard engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("evaluation context has no identifier")]
    MissingIdentifier,

    #[error("type mismatch for variation '{variation}': expected {expected}, got {got}")]
    TypeMismatch {
        variation: VariationId,
        expected: String,
        got: String,
    },
}

impl Error {
    /// Stable machine-readable tag for this error, shared by the FFI and HTTP layers.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::MissingIdentifier => "missing_identifier",
            Error::TypeMismatch { .. } => "type_mismatch",
        }
    }

    /// Whether the fault lies with the flag configuration rather than the context.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_) | Error::TypeMismatch { .. })
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
