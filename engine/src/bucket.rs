//! Deterministic bucketing for percentage rollouts.
//!
//! Every SDK embedding the engine must assign an identifier to the same
//! bucket, so the algorithm here is a fixed, versioned contract:
//!
//! 1. Build the seed string `identifier + ":" + rollout_salt + ":" + rule_id`.
//! 2. Hash its UTF-8 bytes with 32-bit FNV-1a
//!    (offset basis `0x811c9dc5`, prime `0x01000193`).
//! 3. The bucket is `hash % 100`, in `[0, 100)`.
//! 4. Rollout variations are ordered by id, byte-wise ascending, and each
//!    takes the half-open range `[cumulative, cumulative + weight)`.
//!
//! Changing any step re-buckets every live user. Bump [`HASH_VERSION`] if
//! that ever has to happen.

use crate::VariationId;
use std::collections::BTreeMap;

/// Version of the bucketing contract implemented by this module.
pub const HASH_VERSION: u32 = 1;

/// Number of buckets; rollout weights are percentage points.
pub const BUCKET_COUNT: u32 = 100;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Compute the bucket for an identifier within one rollout rule.
pub fn bucket_for(identifier: &str, salt: &str, rule_id: &str) -> u32 {
    let seed = format!("{identifier}:{salt}:{rule_id}");
    fnv1a_32(seed.as_bytes()) % BUCKET_COUNT
}

/// Pick the variation whose cumulative weight range contains `bucket`.
///
/// Weights are walked in key order. Returns `None` only when the weights do
/// not cover the bucket, which validation rules out.
pub fn select_weighted(weights: &BTreeMap<VariationId, u32>, bucket: u32) -> Option<&VariationId> {
    let mut upper = 0u64;
    for (variation_id, weight) in weights {
        upper += u64::from(*weight);
        if u64::from(bucket) < upper {
            return Some(variation_id);
        }
    }
    None
}
