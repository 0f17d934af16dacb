// crates/canon-oracle-core/tests/canonicalize.rs
// ============================================================================
// Module: Canonicalization Tests
// Description: Tests for mask learning and canonical baseline construction.
// ============================================================================
//! ## Overview
//! Validates that nondeterminism between two learning runs is absorbed by the
//! learned mask, that structural disagreement raises warnings, and that the
//! canonical baseline agrees with both runs once masked.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use canon_oracle_core::AlarmCategory;
use canon_oracle_core::FieldPath;
use canon_oracle_core::FieldPattern;
use canon_oracle_core::Mask;
use canon_oracle_core::ObjectKey;
use canon_oracle_core::Operation;
use canon_oracle_core::Value;
use canon_oracle_core::runtime::BaselineRun;
use canon_oracle_core::runtime::Canonicalizer;
use canon_oracle_core::runtime::DigestBuilder;
use canon_oracle_core::runtime::DigestPolicy;
use canon_oracle_core::runtime::OrderPolicy;
use canon_oracle_core::runtime::compare_history;
use canon_oracle_core::runtime::compare_state;
use serde_json::json;

use crate::common::history;
use crate::common::resource;
use crate::common::snapshot;
use crate::common::versioned;

/// Builds a learning run for one deployment at the given resource version.
fn run(version: &str, spec: serde_json::Value) -> BaselineRun {
    BaselineRun {
        history: history(&[
            (Operation::Create, versioned("Deployment", "web", version, spec.clone())),
            (Operation::Sync, versioned("Deployment", "web", version, spec.clone())),
        ]),
        snapshot: snapshot(&[versioned("Deployment", "web", version, spec)]),
    }
}

/// Parses a pattern.
fn pattern(text: &str) -> FieldPattern {
    text.parse().unwrap()
}

// ============================================================================
// SECTION: Mask Learning
// ============================================================================

/// Tests differing resource versions are learned into the mask.
#[test]
fn learns_resource_version_drift() {
    let first = run("101", json!({"replicas": 3}));
    let second = run("977", json!({"replicas": 3}));
    let baseline = Canonicalizer::default().canonicalize(&first, &second);
    let expected: Mask = [pattern("metadata.resourceVersion")].into_iter().collect();
    assert_eq!(baseline.mask, expected);
    assert!(baseline.warnings.is_empty(), "{:?}", baseline.warnings);
    assert!(baseline.warning_result().is_clean());
}

/// Tests identical runs learn an empty mask.
#[test]
fn identical_runs_learn_nothing() {
    let first = run("5", json!({"replicas": 1}));
    let baseline = Canonicalizer::default().canonicalize(&first, &first);
    assert!(baseline.mask.is_empty());
    assert!(baseline.warnings.is_empty());
    assert_eq!(baseline.snapshot, first.snapshot);
}

/// Tests generated keys generalize to wildcards.
#[test]
fn generated_keys_generalize() {
    let first = run("1", json!({"volumes": {"a1b2c3d4e5": {"size": 1}}}));
    let second = run("1", json!({"volumes": {"ffee99887766": {"size": 1}}}));
    let baseline = Canonicalizer::default().canonicalize(&first, &second);
    assert!(baseline.mask.patterns().any(|learned| learned == &pattern("spec.volumes.*")));
    assert!(baseline.warnings.is_empty(), "{:?}", baseline.warnings);
}

/// Tests every learned pattern matches a path that actually differed.
#[test]
fn learned_patterns_match_differing_paths() {
    let first = run("1", json!({"ports": [80, 443], "owner": "a"}));
    let second = run("2", json!({"ports": [80, 8443], "owner": "a"}));
    let baseline = Canonicalizer::default().canonicalize(&first, &second);
    let differing: Vec<FieldPath> = vec![
        "metadata.resourceVersion".parse().unwrap(),
        "spec.ports[1]".parse().unwrap(),
    ];
    for learned in baseline.mask.patterns() {
        assert!(differing.iter().any(|path| learned.matches(path)), "unexpected pattern {learned}");
    }
    assert!(!baseline.mask.matches(&"spec.owner".parse().unwrap()));
}

/// Tests statically ignored paths are never added to the learned mask.
#[test]
fn ignored_paths_are_not_learned() {
    let policy = DigestPolicy {
        order: OrderPolicy::default(),
        ignored: [pattern("resourceVersion")].into_iter().collect(),
    };
    let canonicalizer = Canonicalizer::new(DigestBuilder::new(policy));
    let baseline = canonicalizer.canonicalize(&run("1", json!({})), &run("2", json!({})));
    assert!(baseline.mask.is_empty());
    assert!(baseline.warnings.is_empty(), "{:?}", baseline.warnings);
    let web = baseline.snapshot.get(&"Deployment/default/web".parse::<ObjectKey>().unwrap()).unwrap();
    assert!(web.get("metadata").unwrap().get("resourceVersion").is_none());
}

/// Builds a learning run whose config map only sees syncs.
fn synced(entries: &[(&str, u64)]) -> BaselineRun {
    let events: Vec<(Operation, serde_json::Value)> = entries
        .iter()
        .map(|(version, v)| (Operation::Sync, versioned("ConfigMap", "settings", version, json!({"v": v}))))
        .collect();
    BaselineRun {
        history: history(&events),
        snapshot: snapshot(&[]),
    }
}

/// Tests unordered events pair by content, not by the sort order noise imposes.
#[test]
fn unordered_alignment_ignores_noise_order() {
    // "10" sorts before "9", so the raw sorted order pairs v=2 against v=1.
    let first = synced(&[("9", 1), ("10", 2)]);
    let second = synced(&[("11", 1), ("12", 2)]);
    let baseline = Canonicalizer::default().canonicalize(&first, &second);
    let expected: Mask = [pattern("metadata.resourceVersion")].into_iter().collect();
    assert_eq!(baseline.mask, expected);
    assert!(baseline.warnings.is_empty(), "{:?}", baseline.warnings);

    let drifted = synced(&[("13", 7), ("14", 8)]);
    let result = compare_history(&DigestBuilder::default(), &drifted.history, &baseline.digest, &baseline.mask);
    assert_eq!(result.violation_count, 4);
    assert!(result.messages.iter().all(|alarm| alarm.message.starts_with("ConfigMap/default/settings")));
}

/// Tests identical unordered events pair with each other before near matches.
#[test]
fn unordered_alignment_prefers_identical_events() {
    let first = synced(&[("1", 1), ("7", 2), ("2", 3)]);
    let second = synced(&[("9", 1), ("2", 3), ("8", 2)]);
    let baseline = Canonicalizer::default().canonicalize(&first, &second);
    let expected: Mask = [pattern("metadata.resourceVersion")].into_iter().collect();
    assert_eq!(baseline.mask, expected);
    assert!(baseline.warnings.is_empty(), "{:?}", baseline.warnings);
}

// ============================================================================
// SECTION: Canonical Baseline
// ============================================================================

/// Tests the canonical snapshot agrees with both runs under the mask.
#[test]
fn canonical_snapshot_matches_both_runs() {
    let first = run("1", json!({"ports": [80, 443]}));
    let second = run("2", json!({"ports": [80, 8443]}));
    let baseline = Canonicalizer::default().canonicalize(&first, &second);
    assert!(compare_state(&first.snapshot, &baseline.snapshot, &baseline.mask).is_clean());
    assert!(compare_state(&second.snapshot, &baseline.snapshot, &baseline.mask).is_clean());
    let web = baseline.snapshot.get(&"Deployment/default/web".parse::<ObjectKey>().unwrap()).unwrap();
    assert_eq!(
        web.get("spec").unwrap().get("ports").unwrap(),
        &Value::from(json!([null, null]))
    );
}

// ============================================================================
// SECTION: Warnings
// ============================================================================

/// Tests objects seen in one run only raise warnings.
#[test]
fn one_sided_objects_warn() {
    let first = run("1", json!({}));
    let mut second = run("1", json!({}));
    second.history = history(&[
        (Operation::Create, versioned("Deployment", "web", "1", json!({}))),
        (Operation::Sync, versioned("Deployment", "web", "1", json!({}))),
        (Operation::Create, resource("Job", "migrate", json!({}))),
    ]);
    second.snapshot = snapshot(&[
        versioned("Deployment", "web", "1", json!({})),
        resource("Job", "migrate", json!({})),
    ]);
    let baseline = Canonicalizer::default().canonicalize(&first, &second);
    assert_eq!(baseline.warnings.len(), 2);
    assert!(baseline.warnings.iter().all(|alarm| alarm.category == AlarmCategory::CanonicalizationWarning));
    assert!(baseline.warnings.iter().all(|alarm| alarm.message.starts_with("Job/default/migrate")));
    let advisory = baseline.warning_result();
    assert_eq!(advisory.violation_count, 0);
    assert_eq!(advisory.messages.len(), 2);
}

/// Tests misaligned operations raise warnings.
#[test]
fn operation_mismatch_warns() {
    let first = BaselineRun {
        history: history(&[
            (Operation::Create, resource("Pod", "web-0", json!({}))),
            (Operation::Update, resource("Pod", "web-0", json!({}))),
        ]),
        snapshot: snapshot(&[]),
    };
    let second = BaselineRun {
        history: history(&[
            (Operation::Create, resource("Pod", "web-0", json!({}))),
            (Operation::Delete, resource("Pod", "web-0", json!({}))),
        ]),
        snapshot: snapshot(&[]),
    };
    let baseline = Canonicalizer::default().canonicalize(&first, &second);
    let messages: Vec<&str> = baseline.warnings.iter().map(|alarm| alarm.message.as_str()).collect();
    assert!(messages.iter().any(|message| message.contains("ordered event 1 is update")), "{messages:?}");
    assert!(messages.iter().any(|message| message.contains("beyond the learned mask")), "{messages:?}");
}
