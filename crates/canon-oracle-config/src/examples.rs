// crates/canon-oracle-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `canon-oracle.toml`. The example enables every check and
//! spells out each default so it doubles as reference documentation.

/// Returns a canonical example `canon-oracle.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[checks]
generic_event_generation_enabled = true
generic_state_generation_enabled = true
generic_event_checker_enabled = true
generic_state_checker_enabled = true
operator_checker_enabled = true
test_workload_checker_enabled = true
injection_desc_generation_enabled = true

[digest]
order_insensitive_operations = ["sync"]
ignored_paths = ["metadata.managedFields"]

[artifacts]
event_log = "api-event.log"
resource_listing = "resources.json"
operator_log = "streamed-operator.log"
workload_log = "workload.log"
injection_metadata = "injection.json"
max_artifact_bytes = 67108864

[audit]
sink = "file"
path = "canon-oracle-audit.jsonl"
"#,
    )
}
