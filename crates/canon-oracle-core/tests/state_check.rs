// crates/canon-oracle-core/tests/state_check.rs
// ============================================================================
// Module: State Comparator Tests
// Description: Tests for masked structural comparison of final state.
// ============================================================================
//! ## Overview
//! Validates one alarm per differing leaf, masking of volatile fields, and
//! object-level presence alarms.

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
use canon_oracle_core::FieldPattern;
use canon_oracle_core::Mask;
use canon_oracle_core::runtime::compare_state;
use serde_json::json;

use crate::common::resource;
use crate::common::snapshot;
use crate::common::versioned;

/// Builds a mask from pattern strings.
fn mask(patterns: &[&str]) -> Mask {
    patterns.iter().map(|pattern| pattern.parse::<FieldPattern>().unwrap()).collect()
}

/// Tests masked version drift is ignored while replica drift is flagged.
#[test]
fn masked_version_ignored_replica_change_flagged() {
    let canonical = snapshot(&[versioned("Deployment", "web", "100", json!({"replicas": 3}))]);
    let test = snapshot(&[versioned("Deployment", "web", "250", json!({"replicas": 2}))]);
    let result = compare_state(&test, &canonical, &mask(&["metadata.resourceVersion"]));
    assert_eq!(result.violation_count, 1);
    assert_eq!(result.messages[0].category, AlarmCategory::StateDivergence);
    assert_eq!(
        result.messages[0].message,
        "Deployment/default/web: spec.replicas: expected 3, found 2"
    );
}

/// Tests identical snapshots are clean.
#[test]
fn identical_snapshots_are_clean() {
    let state = snapshot(&[resource("Pod", "web-0", json!({"containers": [{"image": "nginx"}]}))]);
    assert!(compare_state(&state, &state, &Mask::empty()).is_clean());
}

/// Tests each leaf of a one-sided subtree is reported.
#[test]
fn one_sided_subtree_reports_each_leaf() {
    let canonical = snapshot(&[resource("Pod", "web-0", json!({"limits": {"cpu": "1", "memory": "1Gi"}}))]);
    let test = snapshot(&[resource("Pod", "web-0", json!({}))]);
    let result = compare_state(&test, &canonical, &Mask::empty());
    assert_eq!(result.violation_count, 2);
    assert!(result.messages[0].message.contains("spec.limits.cpu"));
    assert!(result.messages[1].message.contains("spec.limits.memory"));
}

/// Tests masked leaves inside a one-sided subtree are skipped.
#[test]
fn one_sided_subtree_respects_mask() {
    let canonical = snapshot(&[resource("Pod", "web-0", json!({}))]);
    let test = snapshot(&[resource("Pod", "web-0", json!({"status": {"phase": "Running", "ip": "10.0.0.1"}}))]);
    let result = compare_state(&test, &canonical, &mask(&["status.ip"]));
    assert_eq!(result.violation_count, 1);
    assert!(result.messages[0].message.contains("spec.status.phase"));
    assert!(result.messages[0].message.contains("unexpected in test run"));
}

/// Tests kind mismatches produce one alarm.
#[test]
fn kind_mismatch_is_one_alarm() {
    let canonical = snapshot(&[resource("Pod", "web-0", json!({"ports": [80, 443]}))]);
    let test = snapshot(&[resource("Pod", "web-0", json!({"ports": "80"}))]);
    let result = compare_state(&test, &canonical, &Mask::empty());
    assert_eq!(result.violation_count, 1);
    assert!(result.messages[0].message.contains("expected sequence"), "{}", result.messages[0]);
}

/// Tests sequence length changes are reported per extra element.
#[test]
fn sequence_growth_is_reported() {
    let canonical = snapshot(&[resource("Pod", "web-0", json!({"ports": [80]}))]);
    let test = snapshot(&[resource("Pod", "web-0", json!({"ports": [80, 443]}))]);
    let result = compare_state(&test, &canonical, &Mask::empty());
    assert_eq!(result.violation_count, 1);
    assert!(result.messages[0].message.contains("spec.ports[1]"));
}

/// Tests object presence alarms.
#[test]
fn missing_and_unexpected_objects() {
    let canonical = snapshot(&[resource("Pod", "a", json!({}))]);
    let test = snapshot(&[resource("Pod", "b", json!({}))]);
    let result = compare_state(&test, &canonical, &Mask::empty());
    assert_eq!(result.violation_count, 2);
    assert_eq!(result.messages[0].message, "Pod/default/a: object missing from test run");
    assert_eq!(result.messages[1].message, "Pod/default/b: unexpected object in test run");
}

/// Tests wildcard masks hide generated keys.
#[test]
fn wildcard_mask_hides_generated_keys() {
    let canonical = snapshot(&[resource("Pod", "web-0", json!({"volumes": {"a1b2c3d4e5": {"size": 1}}}))]);
    let test = snapshot(&[resource("Pod", "web-0", json!({"volumes": {"ffee99887766": {"size": 1}}}))]);
    assert_eq!(compare_state(&test, &canonical, &Mask::empty()).violation_count, 2);
    assert!(compare_state(&test, &canonical, &mask(&["spec.volumes.*"])).is_clean());
}
