//! # Switchyard Engine
//!
//! A deterministic feature-flag evaluation engine.
//!
//! Given a flag's configuration (variations, targeting rules, rollout policy)
//! and an evaluation context (an identifier plus attributes), the engine
//! decides which variation the identifier receives. Every SDK embedding the
//! engine must reach the same decision, so the same inputs always produce the
//! same outputs.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine never touches files, network or clocks
//! - **Deterministic**: bucketing is a pinned, versioned hash contract
//! - **Stateless**: nothing is retained between calls; safe to call from any thread
//! - **Portable**: runs anywhere Rust runs, and other runtimes link it via [`ffi`]
//!
//! ## Evaluation Pipeline
//!
//! 1. [`select_rule`] walks the rules in order; the first rule whose
//!    [`RuleCondition`]s all match wins. A disabled flag skips straight to
//!    the default.
//! 2. [`resolve_value`] turns the selection into a variation: the default,
//!    the rule's direct variation, or a weighted pick bucketed on
//!    [`resolve_identifier`].
//! 3. The variation's value is checked against its declared type.
//!
//! [`evaluate_flag`] composes all of it and tags the result with a [`Reason`].
//!
//! ## Quick Start
//!
//! ```rust
//! use switchyard_engine::{
//!     evaluate_flag, EngineRule, EvaluationContext, FlagConfig, FlagVariation, Operator,
//!     Reason, RuleCondition,
//! };
//!
//! let flag = FlagConfig::new(
//!     "new-ui",
//!     vec![
//!         FlagVariation::new("on", true.into()),
//!         FlagVariation::new("off", false.into()),
//!     ],
//!     "off",
//! )
//! .with_rule(
//!     EngineRule::serve("beta-users", "on")
//!         .with_condition(RuleCondition::new("plan", Operator::Equals, "beta")),
//! );
//!
//! let ctx = EvaluationContext::new("u1").with_attribute("plan", "beta");
//! let result = evaluate_flag(&flag, &ctx).unwrap();
//! assert_eq!(result.variation_id, "on");
//! assert_eq!(result.reason, Reason::RuleMatch);
//! ```
//!
//! ## Bucketing
//!
//! See [`bucket`] for the exact hash and range-building contract.

pub mod bucket;
pub mod condition;
pub mod context;
pub mod error;
pub mod evaluate;
pub mod ffi;
pub mod flag;
pub mod identifier;
pub mod rule;
pub mod semver;
pub mod value;

// Re-export main types at crate root
pub use bucket::{bucket_for, HASH_VERSION};
pub use condition::{Operator, RuleCondition};
pub use context::{AttributeValue, EvaluationContext};
pub use error::{ConfigError, Error};
pub use evaluate::{evaluate_flag, resolve_value, EvaluationResult, Reason, ResolvedValue};
pub use flag::{FlagConfig, FlagVariation, ValidatedFlag};
pub use identifier::resolve_identifier;
pub use rule::{select_rule, EngineRule, RuleOutcome, Selection};
pub use value::{VariationTypeLabel, VariationValue};

/// Type aliases for clarity
pub type FlagKey = String;
pub type VariationId = String;
pub type RuleId = String;
