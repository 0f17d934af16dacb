// crates/canon-oracle-core/tests/history_check.rs
// ============================================================================
// Module: History Comparator Tests
// Description: Tests for missing, extra, and misordered event detection.
// ============================================================================
//! ## Overview
//! Validates per-instance multiset alarms, the single order-violation alarm,
//! object-level presence alarms, and deterministic alarm ordering.

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
use canon_oracle_core::History;
use canon_oracle_core::Mask;
use canon_oracle_core::Operation;
use canon_oracle_core::runtime::DigestBuilder;
use canon_oracle_core::runtime::build_digest;
use canon_oracle_core::runtime::compare_digests;
use canon_oracle_core::runtime::compare_history;
use serde_json::json;

use crate::common::history;
use crate::common::resource;

/// Compares two histories under an empty mask.
fn compare(test: &History, canonical: &History) -> canon_oracle_core::CheckResult {
    let canonical = build_digest(canonical, &Mask::empty());
    compare_history(&DigestBuilder::default(), test, &canonical, &Mask::empty())
}

/// Returns the categories of a result's alarms.
fn categories(result: &canon_oracle_core::CheckResult) -> Vec<AlarmCategory> {
    result.messages.iter().map(|alarm| alarm.category).collect()
}

// ============================================================================
// SECTION: Equality
// ============================================================================

/// Tests identical histories produce no alarms.
#[test]
fn identical_histories_are_clean() {
    let run = history(&[
        (Operation::Create, resource("Pod", "web-0", json!({"v": 1}))),
        (Operation::Update, resource("Pod", "web-0", json!({"v": 2}))),
    ]);
    let result = compare(&run, &run);
    assert!(result.is_clean());
    assert!(result.messages.is_empty());
}

/// Tests reordered syncs are tolerated.
#[test]
fn reordered_syncs_are_clean() {
    let canonical = history(&[
        (Operation::Sync, resource("Pod", "web-0", json!({"v": 1}))),
        (Operation::Sync, resource("Pod", "web-0", json!({"v": 2}))),
    ]);
    let test = history(&[
        (Operation::Sync, resource("Pod", "web-0", json!({"v": 2}))),
        (Operation::Sync, resource("Pod", "web-0", json!({"v": 1}))),
    ]);
    assert!(compare(&test, &canonical).is_clean());
}

// ============================================================================
// SECTION: Violations
// ============================================================================

/// Tests swapped updates produce exactly one order violation.
#[test]
fn swapped_updates_produce_one_order_violation() {
    let canonical = history(&[
        (Operation::Create, resource("Pod", "web-0", json!({"v": 0}))),
        (Operation::Update, resource("Pod", "web-0", json!({"v": 1}))),
        (Operation::Update, resource("Pod", "web-0", json!({"v": 2}))),
    ]);
    let test = history(&[
        (Operation::Create, resource("Pod", "web-0", json!({"v": 0}))),
        (Operation::Update, resource("Pod", "web-0", json!({"v": 2}))),
        (Operation::Update, resource("Pod", "web-0", json!({"v": 1}))),
    ]);
    let result = compare(&test, &canonical);
    assert_eq!(result.violation_count, 1);
    assert_eq!(categories(&result), vec![AlarmCategory::OrderViolation]);
    assert!(result.messages[0].message.starts_with("Pod/default/web-0: expected order"));
}

/// Tests a missing duplicate sync is reported once.
#[test]
fn missing_sync_instance_is_reported() {
    let sync = resource("Pod", "web-0", json!({}));
    let canonical = history(&[(Operation::Sync, sync.clone()), (Operation::Sync, sync.clone())]);
    let test = history(&[(Operation::Sync, sync)]);
    let result = compare(&test, &canonical);
    assert_eq!(result.violation_count, 1);
    assert_eq!(categories(&result), vec![AlarmCategory::MissingEvent]);

    let reverse = compare(&canonical, &test);
    assert_eq!(reverse.violation_count, 1);
    assert_eq!(categories(&reverse), vec![AlarmCategory::ExtraEvent]);
}

/// Tests a changed event is both missing and extra, without an order alarm.
#[test]
fn changed_event_is_missing_and_extra() {
    let canonical = history(&[
        (Operation::Create, resource("Pod", "web-0", json!({}))),
        (Operation::Update, resource("Pod", "web-0", json!({"image": "v1"}))),
    ]);
    let test = history(&[
        (Operation::Create, resource("Pod", "web-0", json!({}))),
        (Operation::Update, resource("Pod", "web-0", json!({"image": "v2"}))),
    ]);
    let result = compare(&test, &canonical);
    assert_eq!(result.violation_count, 2);
    assert_eq!(categories(&result), vec![AlarmCategory::MissingEvent, AlarmCategory::ExtraEvent]);
}

/// Tests whole-object presence alarms.
#[test]
fn missing_and_extra_objects_are_reported_once() {
    let canonical = history(&[
        (Operation::Create, resource("Pod", "web-0", json!({}))),
        (Operation::Update, resource("Pod", "web-0", json!({"v": 1}))),
    ]);
    let test = history(&[(Operation::Create, resource("Pod", "web-1", json!({})))]);
    let result = compare(&test, &canonical);
    assert_eq!(result.violation_count, 2);
    assert_eq!(categories(&result), vec![AlarmCategory::MissingEvent, AlarmCategory::ExtraEvent]);
    assert!(result.messages[0].message.contains("web-0"));
    assert!(result.messages[1].message.contains("web-1"));
}

/// Tests alarm output does not depend on comparison order of objects.
#[test]
fn alarms_are_sorted_and_deterministic() {
    let canonical = history(&[
        (Operation::Create, resource("Pod", "b", json!({}))),
        (Operation::Create, resource("Pod", "a", json!({}))),
    ]);
    let test = History::empty();
    let first = compare(&test, &canonical);
    let second = compare(&test, &canonical);
    assert_eq!(first, second);
    let mut sorted = first.messages.clone();
    sorted.sort();
    assert_eq!(first.messages, sorted);
}

/// Tests comparing pre-built digests matches the history entry point.
#[test]
fn digest_comparison_matches_history_comparison() {
    let canonical = history(&[(Operation::Create, resource("Pod", "web-0", json!({})))]);
    let test = history(&[(Operation::Delete, resource("Pod", "web-0", json!({})))]);
    let direct = compare_digests(
        &build_digest(&test, &Mask::empty()),
        &build_digest(&canonical, &Mask::empty()),
    );
    assert_eq!(direct, compare(&test, &canonical));
}
