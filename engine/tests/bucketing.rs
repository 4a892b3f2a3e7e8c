//! Bucketing contract tests.
//!
//! The vectors below are shared with every SDK implementation. A change to any
//! of them means live users get re-bucketed.

use switchyard_engine::{
    bucket::{fnv1a_32, select_weighted},
    bucket_for, evaluate_flag, EngineRule, EvaluationContext, FlagConfig, FlagVariation, Operator,
    Reason, RuleCondition, HASH_VERSION,
};

fn split_flag(key: &str, weights: &[(&str, u32)]) -> FlagConfig {
    let variations = weights
        .iter()
        .map(|(id, _)| FlagVariation::new(*id, (*id).into()))
        .collect();
    FlagConfig::new(key, variations, weights[0].0).with_rule(EngineRule::rollout(
        "split",
        weights.iter().map(|(id, w)| (*id, *w)),
    ))
}

// ============================================================================
// Pinned Vectors
// ============================================================================

#[test]
fn hash_contract_version() {
    assert_eq!(HASH_VERSION, 1);
}

#[test]
fn pinned_identifier_buckets() {
    let vectors = [
        ("u1", 0x7a51_0eda_u32, 70),
        ("user-42", 0x5bef_43b2, 90),
        ("alice", 0x71cc_24de, 90),
        ("bob", 0x84b3_668f, 11),
        ("anon-7f3a", 0xc51e_78e6, 82),
        ("émile", 0xe597_c507, 39),
    ];

    for (identifier, hash, bucket) in vectors {
        let seed = format!("{identifier}:new-ui:split");
        assert_eq!(fnv1a_32(seed.as_bytes()), hash, "hash for {identifier}");
        assert_eq!(bucket_for(identifier, "new-ui", "split"), bucket, "bucket for {identifier}");
    }
}

#[test]
fn variations_ordered_by_id_not_declaration() {
    // "bob" lands in bucket 11. Declaration order would give zeta [0, 20);
    // id order gives alpha [0, 80).
    let declared_z_first = split_flag("new-ui", &[("zeta", 20), ("alpha", 80)]);
    let result = evaluate_flag(&declared_z_first, &EvaluationContext::new("bob")).unwrap();
    assert_eq!(result.variation_id, "alpha");

    let declared_a_first = split_flag("new-ui", &[("alpha", 80), ("zeta", 20)]);
    let result = evaluate_flag(&declared_a_first, &EvaluationContext::new("bob")).unwrap();
    assert_eq!(result.variation_id, "alpha");
}

#[test]
fn salt_defaults_to_flag_key() {
    let keyed = split_flag("new-ui", &[("a", 50), ("b", 50)]);
    let salted = split_flag("renamed", &[("a", 50), ("b", 50)]).with_salt("new-ui");

    for id in ["u1", "user-42", "alice", "bob", "anon-7f3a"] {
        let ctx = EvaluationContext::new(id);
        assert_eq!(
            evaluate_flag(&keyed, &ctx).unwrap().variation_id,
            evaluate_flag(&salted, &ctx).unwrap().variation_id,
        );
    }
}

// ============================================================================
// Distribution
// ============================================================================

#[test]
fn weight_conservation_30_70() {
    let flag = split_flag("checkout", &[("A", 30), ("B", 70)]);
    let total = 10_000;
    let mut a = 0;
    for i in 0..total {
        let ctx = EvaluationContext::new(format!("user-{i}"));
        if evaluate_flag(&flag, &ctx).unwrap().variation_id == "A" {
            a += 1;
        }
    }
    assert!((2_800..=3_200).contains(&a), "A served {a} of {total}");
}

#[test]
fn weight_conservation_three_way() {
    let flag = split_flag("checkout", &[("a", 25), ("b", 50), ("c", 25)]);
    let mut counts = [0u32; 3];
    for i in 0..10_000 {
        let ctx = EvaluationContext::new(format!("user-{i}"));
        match evaluate_flag(&flag, &ctx).unwrap().variation_id.as_str() {
            "a" => counts[0] += 1,
            "b" => counts[1] += 1,
            "c" => counts[2] += 1,
            other => panic!("unexpected variation {other}"),
        }
    }
    assert!((2_300..=2_700).contains(&counts[0]), "{counts:?}");
    assert!((4_700..=5_300).contains(&counts[1]), "{counts:?}");
    assert!((2_300..=2_700).contains(&counts[2]), "{counts:?}");
}

#[test]
fn every_bucket_is_covered() {
    let weights: std::collections::BTreeMap<String, u32> =
        [("a".to_string(), 1), ("b".to_string(), 98), ("c".to_string(), 1)]
        .into_iter()
        .collect();
    for bucket in 0..100 {
        assert!(select_weighted(&weights, bucket).is_some(), "bucket {bucket}");
    }
}

// ============================================================================
// Stability
// ============================================================================

#[test]
fn appending_rules_keeps_existing_assignments() {
    let targeted = |flag: FlagConfig| {
        flag.with_rule(
            EngineRule::rollout("beta-split", [("A", 50), ("B", 50)])
                .with_condition(RuleCondition::new("plan", Operator::Equals, "beta")),
        )
    };
    let base = FlagConfig::new(
        "checkout",
        vec![
            FlagVariation::new("A", "a".into()),
            FlagVariation::new("B", "b".into()),
            FlagVariation::new("C", "c".into()),
        ],
        "C",
    );
    let before = targeted(base.clone());
    let after = targeted(base).with_rule(EngineRule::rollout("everyone", [("A", 10), ("C", 90)]));

    for i in 0..500 {
        let plan = if i % 2 == 0 { "beta" } else { "free" };
        let ctx = EvaluationContext::new(format!("user-{i}")).with_attribute("plan", plan);

        let old = evaluate_flag(&before, &ctx).unwrap();
        let new = evaluate_flag(&after, &ctx).unwrap();
        if old.reason == Reason::Rollout {
            assert_eq!(old, new, "beta user re-bucketed: user-{i}");
        } else {
            assert_eq!(new.rule_id.as_deref(), Some("everyone"));
        }
    }
}

#[test]
fn salt_and_rule_decorrelate_assignments() {
    let in_lower_half = |salt: &str, rule: &str, i: u32| bucket_for(&format!("user-{i}"), salt, rule) < 50;

    let across_rules = (0..1000)
        .filter(|&i| in_lower_half("checkout", "rule-a", i) != in_lower_half("checkout", "rule-b", i))
        .count();
    let across_salts = (0..1000)
        .filter(|&i| in_lower_half("checkout", "split", i) != in_lower_half("pricing", "split", i))
        .count();

    // independent 50/50 splits disagree about half the time
    assert!((350..=700).contains(&across_rules), "{across_rules}");
    assert!((350..=700).contains(&across_salts), "{across_salts}");
}
