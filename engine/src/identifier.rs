//! Identifier resolution.
//!
//! The identifier is the stable subject every percentage rollout buckets on.
//! Resolution is a pure normalization of the context's `identifierKey`: no
//! hashing, no time, no environment.

use crate::{error::Result, Error, EvaluationContext};

/// Resolve the bucketing key for a context.
///
/// Leading and trailing whitespace is trimmed. An empty result fails with
/// [`Error::MissingIdentifier`].
pub fn resolve_identifier(context: &EvaluationContext) -> Result<String> {
    let key = context.identifier_key.trim();
    if key.is_empty() {
        return Err(Error::MissingIdentifier);
    }
    Ok(key.to_string())
}
