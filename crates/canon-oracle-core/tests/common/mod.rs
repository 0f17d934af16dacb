// crates/canon-oracle-core/tests/common/mod.rs
// ============================================================================
// Module: Oracle Test Fixtures
// Description: Shared builders for histories, snapshots, and raw run artifacts.
// ============================================================================
//! ## Overview
//! Builders that keep individual tests focused on behavior rather than
//! artifact plumbing.

#![allow(dead_code, reason = "Each test binary uses a different subset of fixtures.")]

use canon_oracle_core::Event;
use canon_oracle_core::History;
use canon_oracle_core::Operation;
use canon_oracle_core::StateSnapshot;
use canon_oracle_core::Value;
use serde_json::json;

/// Builds a resource object with identity fields and the given spec.
pub fn resource(kind: &str, name: &str, spec: serde_json::Value) -> serde_json::Value {
    json!({
        "kind": kind,
        "metadata": {"name": name, "namespace": "default"},
        "spec": spec,
    })
}

/// Builds a resource object carrying a resource version.
pub fn versioned(kind: &str, name: &str, version: &str, spec: serde_json::Value) -> serde_json::Value {
    json!({
        "kind": kind,
        "metadata": {"name": name, "namespace": "default", "resourceVersion": version},
        "spec": spec,
    })
}

/// Builds a history from `(operation, object)` pairs in order.
pub fn history(entries: &[(Operation, serde_json::Value)]) -> History {
    let events = entries
        .iter()
        .enumerate()
        .map(|(index, (operation, object))| {
            let sequence = u64::try_from(index).unwrap() + 1;
            Event::from_object(*operation, &Value::from(object.clone()), sequence).unwrap()
        })
        .collect();
    History::new(events).unwrap()
}

/// Builds a snapshot from listed objects.
pub fn snapshot(objects: &[serde_json::Value]) -> StateSnapshot {
    StateSnapshot::from_objects(objects.iter().cloned().map(Value::from)).unwrap()
}

/// Renders an event log line.
pub fn event_line(operation: &str, object: &serde_json::Value) -> String {
    format!("I0101 00:00:00.000 1 watch.go:42] [API-EVENT]\t{operation}\t{object}")
}

/// Renders a complete event log.
pub fn event_log(entries: &[(&str, serde_json::Value)]) -> String {
    let mut out = String::from("I0101 00:00:00.000 1 main.go:10] starting watcher\n");
    for (operation, object) in entries {
        out.push_str(&event_line(operation, object));
        out.push('\n');
    }
    out
}

/// Injection metadata in which every action fired.
pub fn fired_injection() -> serde_json::Value {
    json!({
        "test_plan": "restart-leader",
        "actions": [{"action": "restart kind-control-plane", "fired": true}],
    })
}
