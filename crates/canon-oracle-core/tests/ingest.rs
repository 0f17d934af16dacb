// crates/canon-oracle-core/tests/ingest.rs
// ============================================================================
// Module: Artifact Ingestion Tests
// Description: Tests for event log and resource listing parsing.
// ============================================================================
//! ## Overview
//! Validates that raw run artifacts become histories and snapshots, and that
//! malformed input is reported with a typed error instead of a panic.

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

use canon_oracle_core::History;
use canon_oracle_core::ObjectKey;
use canon_oracle_core::Operation;
use canon_oracle_core::ParseError;
use canon_oracle_core::Value;
use canon_oracle_core::runtime::parse_event_log;
use canon_oracle_core::runtime::parse_resource_listing;
use serde_json::json;

use crate::common::event_log;
use crate::common::resource;

// ============================================================================
// SECTION: Event Log
// ============================================================================

/// Tests marked lines become events with increasing sequence numbers.
#[test]
fn event_log_parses_marked_lines_in_order() {
    let log = event_log(&[
        ("create", resource("Pod", "web-0", json!({"replicas": 1}))),
        ("update", resource("Pod", "web-0", json!({"replicas": 2}))),
        ("sync", resource("ConfigMap", "settings", json!({}))),
    ]);
    let history = parse_event_log(&log).unwrap();
    let events = history.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].operation, Operation::Create);
    assert_eq!(events[1].operation, Operation::Update);
    assert_eq!(events[2].operation, Operation::Sync);
    assert_eq!(
        events.iter().map(|event| event.sequence_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(events[0].object_key, "Pod/default/web-0".parse::<ObjectKey>().unwrap());
    let replicas = events[1].observed_fields.get(&"spec.replicas".parse().unwrap()).unwrap();
    assert_eq!(replicas, &Value::integer(2));
}

/// Tests unmarked lines are ignored.
#[test]
fn event_log_ignores_unmarked_lines() {
    let history = parse_event_log("plain line\nanother line\n").unwrap();
    assert!(history.is_empty());
}

/// Tests malformed marked lines carry their line number.
#[test]
fn event_log_reports_malformed_line_number() {
    let mut log = event_log(&[("create", resource("Pod", "web-0", json!({})))]);
    log.push_str("[API-EVENT]\tcreate\t{not json}\n");
    let err = parse_event_log(&log).unwrap_err();
    assert!(matches!(err, ParseError::Line { line: 3, .. }), "{err}");
}

/// Tests unknown operations are rejected.
#[test]
fn event_log_rejects_unknown_operation() {
    let log = format!("[API-EVENT]\tfrobnicate\t{}", resource("Pod", "web-0", json!({})));
    let err = parse_event_log(&log).unwrap_err();
    let ParseError::Line { reason, .. } = err else {
        panic!("expected line error");
    };
    assert!(reason.contains("frobnicate"));
}

/// Tests objects without a name are rejected.
#[test]
fn event_log_rejects_missing_identity() {
    let log = format!("[API-EVENT]\tcreate\t{}", json!({"kind": "Pod", "metadata": {}}));
    assert!(parse_event_log(&log).is_err());
}

/// Tests cluster-scoped objects get an empty namespace.
#[test]
fn event_log_accepts_cluster_scoped_objects() {
    let object = json!({"kind": "Node", "metadata": {"name": "worker-1"}});
    let history = parse_event_log(&format!("[API-EVENT]\tsync\t{object}")).unwrap();
    assert_eq!(history.events()[0].object_key.to_string(), "Node//worker-1");
}

// ============================================================================
// SECTION: History Invariants
// ============================================================================

/// Tests histories reject non-increasing sequence numbers on decode.
#[test]
fn history_rejects_non_increasing_sequence_numbers() {
    let object = resource("Pod", "web-0", json!({}));
    let encoded = json!([
        {"object_key": "Pod/default/web-0", "operation": "create", "observed_fields": {}, "sequence_number": 2},
        {"object_key": "Pod/default/web-0", "operation": "update", "observed_fields": {}, "sequence_number": 2},
    ]);
    assert!(serde_json::from_value::<History>(encoded).is_err());
    let log = event_log(&[("create", object)]);
    let history = parse_event_log(&log).unwrap();
    let round: History = serde_json::from_value(serde_json::to_value(&history).unwrap()).unwrap();
    assert_eq!(round, history);
}

// ============================================================================
// SECTION: Resource Listing
// ============================================================================

/// Tests both listing shapes are accepted.
#[test]
fn resource_listing_accepts_array_and_items_object() {
    let objects = json!([resource("Pod", "web-0", json!({})), resource("Pod", "web-1", json!({}))]);
    let from_array = parse_resource_listing(objects.to_string().as_bytes()).unwrap();
    let wrapped = json!({"apiVersion": "v1", "items": objects});
    let from_items = parse_resource_listing(wrapped.to_string().as_bytes()).unwrap();
    assert_eq!(from_array, from_items);
    assert_eq!(from_array.len(), 2);
}

/// Tests duplicate objects are rejected.
#[test]
fn resource_listing_rejects_duplicates() {
    let objects = json!([resource("Pod", "web-0", json!({})), resource("Pod", "web-0", json!({}))]);
    let err = parse_resource_listing(objects.to_string().as_bytes()).unwrap_err();
    assert!(matches!(err, ParseError::Snapshot(_)));
}

/// Tests invalid shapes are rejected.
#[test]
fn resource_listing_rejects_bad_shapes() {
    assert!(parse_resource_listing(b"not json").is_err());
    assert!(parse_resource_listing(b"{\"kind\": \"List\"}").is_err());
    assert!(parse_resource_listing(b"[1, 2]").is_err());
}
