// crates/canon-oracle-core/tests/paths.rs
// ============================================================================
// Module: Field Path and Mask Tests
// Description: Tests for path notation, pattern matching, and mask coverage.
// ============================================================================
//! ## Overview
//! Validates dot/bracket notation, suffix pattern matching, generalization of
//! generated identifiers, and subtree masking.

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

use canon_oracle_core::FieldPath;
use canon_oracle_core::FieldPattern;
use canon_oracle_core::Mask;
use canon_oracle_core::ParseError;
use canon_oracle_core::Segment;
use canon_oracle_core::Value;
use canon_oracle_core::path::looks_generated;
use serde_json::json;

/// Parses a pattern.
fn pattern(text: &str) -> FieldPattern {
    text.parse().unwrap()
}

/// Parses a path.
fn path(text: &str) -> FieldPath {
    text.parse().unwrap()
}

// ============================================================================
// SECTION: Notation
// ============================================================================

/// Tests dotted and indexed paths parse into segments.
#[test]
fn field_path_parses_keys_and_indices() {
    let parsed = path("spec.containers[0].image");
    assert_eq!(
        parsed.segments(),
        &[
            Segment::Key("spec".to_string()),
            Segment::Key("containers".to_string()),
            Segment::Index(0),
            Segment::Key("image".to_string()),
        ]
    );
    assert_eq!(parsed.to_string(), "spec.containers[0].image");
}

/// Tests keys with separators render bracket-quoted and parse back.
#[test]
fn field_path_quotes_ambiguous_keys() {
    let built = FieldPath::root().child_key("metadata").child_key("labels").child_key("app.kubernetes.io/name");
    let rendered = built.to_string();
    assert_eq!(rendered, "metadata.labels[\"app.kubernetes.io/name\"]");
    assert_eq!(path(&rendered), built);
}

/// Tests a quoted leading key renders without a dot.
#[test]
fn field_path_quotes_leading_key() {
    let built = FieldPath::root().child_key("a.b").child_index(2);
    assert_eq!(built.to_string(), "[\"a.b\"][2]");
    assert_eq!(path("[\"a.b\"][2]"), built);
}

/// Tests malformed paths are rejected.
#[test]
fn field_path_rejects_malformed_input() {
    for input in [".spec", "spec..image", "spec[", "spec[x]", "spec[0", "spec]", "spec[*]"] {
        let err = input.parse::<FieldPath>().unwrap_err();
        assert!(matches!(err, ParseError::FieldPath { .. }), "{input} should fail");
    }
}

/// Tests empty patterns are rejected.
#[test]
fn field_pattern_rejects_empty_input() {
    assert!("".parse::<FieldPattern>().is_err());
}

/// Tests paths serialize as strings.
#[test]
fn field_path_serializes_as_string() {
    let encoded = serde_json::to_value(path("spec.replicas")).unwrap();
    assert_eq!(encoded, json!("spec.replicas"));
}

// ============================================================================
// SECTION: Matching
// ============================================================================

/// Tests single-key patterns match the key anywhere.
#[test]
fn pattern_matches_by_suffix() {
    let version = pattern("resourceVersion");
    assert!(version.matches(&path("metadata.resourceVersion")));
    assert!(version.matches(&path("resourceVersion")));
    assert!(!version.matches(&path("metadata.resourceVersion.extra")));

    let replicas = pattern("spec.replicas");
    assert!(replicas.matches(&path("spec.replicas")));
    assert!(!replicas.matches(&path("status.replicas")));
}

/// Tests wildcard segments match only their segment kind.
#[test]
fn pattern_wildcards_match_segment_kinds() {
    let any_index = pattern("containers[*].image");
    assert!(any_index.matches(&path("spec.containers[3].image")));
    assert!(!any_index.matches(&path("spec.containers.main.image")));

    let any_key = pattern("annotations.*");
    assert!(any_key.matches(&path("metadata.annotations.owner")));
    assert!(!any_key.matches(&path("metadata.annotations[0]")));
}

// ============================================================================
// SECTION: Generalization
// ============================================================================

/// Tests generated identifiers and indices generalize to wildcards.
#[test]
fn generalize_replaces_indices_and_generated_keys() {
    let concrete = FieldPath::root()
        .child_key("status")
        .child_key("6f1c2d3e-aaaa-4bbb-8ccc-0123456789ab")
        .child_key("conditions")
        .child_index(1)
        .child_key("lastTransitionTime");
    let general = concrete.generalize().unwrap();
    assert_eq!(general.to_string(), "status.*.conditions[*].lastTransitionTime");
    assert!(general.matches(&concrete));
    assert!(FieldPath::root().generalize().is_none());
}

/// Tests generated identifier detection.
#[test]
fn looks_generated_classifies_tokens() {
    assert!(looks_generated("6f1c2d3e-aaaa-4bbb-8ccc-0123456789ab"));
    assert!(looks_generated("12345"));
    assert!(looks_generated("deadbeef01"));
    assert!(!looks_generated("deadbeef"));
    assert!(!looks_generated("replicas"));
    assert!(!looks_generated("abc1"));
}

// ============================================================================
// SECTION: Masks
// ============================================================================

/// Tests masking a node covers its descendants.
#[test]
fn mask_covers_subtrees() {
    let mask: Mask = [pattern("metadata.annotations")].into_iter().collect();
    assert!(mask.covers(&path("metadata.annotations")));
    assert!(mask.covers(&path("metadata.annotations.owner")));
    assert!(!mask.covers(&path("metadata.labels.owner")));
    assert!(!mask.matches(&path("metadata.annotations.owner")));
}

/// Tests pruning drops masked keys and nulls masked elements.
#[test]
fn mask_prune_keeps_sequence_positions() {
    let mask: Mask = [pattern("resourceVersion"), pattern("ports[0]")].into_iter().collect();
    let value = Value::from(json!({
        "metadata": {"name": "web", "resourceVersion": "7"},
        "ports": [80, 443],
    }));
    let pruned = serde_json::Value::from(mask.prune(&value));
    assert_eq!(pruned, json!({"metadata": {"name": "web"}, "ports": [null, 443]}));
}

/// Tests the mask serializes as a sorted list of strings.
#[test]
fn mask_serializes_sorted() {
    let mask: Mask = [pattern("spec.replicas"), pattern("metadata.uid")].into_iter().collect();
    let encoded = serde_json::to_value(&mask).unwrap();
    assert_eq!(encoded, json!(["metadata.uid", "spec.replicas"]));
    let decoded: Mask = serde_json::from_value(encoded).unwrap();
    assert_eq!(decoded, mask);
}

// ============================================================================
// SECTION: Values
// ============================================================================

/// Tests leaves include scalars and empty containers.
#[test]
fn value_leaves_include_empty_containers() {
    let value = Value::from(json!({"a": {"b": 1, "c": []}, "d": {}}));
    let leaves: Vec<String> = value.leaves().keys().map(ToString::to_string).collect();
    assert_eq!(leaves, vec!["a.b", "a.c", "d"]);
}

/// Tests numbers compare by value across representations.
#[test]
fn value_numbers_compare_by_value() {
    let signed = Value::from(json!(5));
    let unsigned = Value::from(serde_json::Value::from(5u64));
    assert_eq!(signed, unsigned);
    assert!(Value::from(json!(-1)) < Value::from(json!(u64::MAX)));
    assert!(Value::from(json!(1.5)) < Value::from(json!(2)));
}
