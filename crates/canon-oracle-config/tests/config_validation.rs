//! Validation tests for canon-oracle-config.
// crates/canon-oracle-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Tests for section defaults and fail-closed validation.
// Purpose: Ensure invalid configuration is rejected before evaluation starts.
// =============================================================================

use canon_oracle_config::AuditSinkKind;
use canon_oracle_config::ConfigError;
use canon_oracle_config::MAX_ARTIFACT_BYTES_LIMIT;
use canon_oracle_config::OracleConfig;
use canon_oracle_config::config_toml_example;
use canon_oracle_core::FieldPath;
use canon_oracle_core::Operation;
use canon_oracle_core::runtime::DEFAULT_MAX_ARTIFACT_BYTES;

mod common;

use crate::common::TestResult;
use crate::common::assert_invalid;
use crate::common::config_with;
use crate::common::minimal_config;

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn minimal_config_applies_defaults() -> TestResult {
    let config = minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.digest.order_insensitive_operations != vec!["sync".to_string()] {
        return Err("default order policy should treat only sync as unordered".to_string());
    }
    if config.artifacts.max_artifact_bytes != DEFAULT_MAX_ARTIFACT_BYTES {
        return Err("default artifact limit mismatch".to_string());
    }
    if config.audit.sink != AuditSinkKind::Stderr {
        return Err("default audit sink should be stderr".to_string());
    }
    Ok(())
}

#[test]
fn evaluator_config_threads_policy() -> TestResult {
    let config = config_with(
        "[digest]\norder_insensitive_operations = [\"sync\", \"patch\"]\nignored_paths = [\"status.*\"]\n\n[artifacts]\nevent_log = \"events/api.log\"\n",
    )
    .map_err(|err| err.to_string())?;
    let evaluator = config.evaluator_config().map_err(|err| err.to_string())?;
    let order = &evaluator.digest_policy.order;
    if order.is_order_sensitive(Operation::Patch) || !order.is_order_sensitive(Operation::Update) {
        return Err("order policy not threaded".to_string());
    }
    let path = "status.abc.ready".parse::<FieldPath>().map_err(|err| format!("{err}"))?;
    if !evaluator.digest_policy.ignored.covers(&path) {
        return Err("ignored paths not threaded".to_string());
    }
    if evaluator.inputs.event_log != "events/api.log" || evaluator.inputs.workload_log != "workload.log" {
        return Err("artifact names not threaded".to_string());
    }
    Ok(())
}

#[test]
fn example_config_is_valid() -> TestResult {
    let config = OracleConfig::from_toml(&config_toml_example()).map_err(|err| err.to_string())?;
    if config.audit.sink != AuditSinkKind::File {
        return Err("example should use the file sink".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: Checks
// ============================================================================

#[test]
fn missing_toggle_is_rejected() -> TestResult {
    let toml = "[checks]
generic_event_generation_enabled = true
generic_state_generation_enabled = true
generic_event_checker_enabled = true
generic_state_checker_enabled = true
operator_checker_enabled = true
test_workload_checker_enabled = true
";
    let result = OracleConfig::from_toml(toml);
    if !matches!(result, Err(ConfigError::Parse(_))) {
        return Err("expected parse error".to_string());
    }
    assert_invalid(OracleConfig::from_toml(toml), "injection_desc_generation_enabled")
}

#[test]
fn missing_checks_table_is_rejected() -> TestResult {
    assert_invalid(OracleConfig::from_toml(""), "checks")
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    assert_invalid(config_with("[digest]\norder_sensitive = []\n"), "order_sensitive")?;
    assert_invalid(config_with("[extras]\nenabled = true\n"), "extras")
}

// ============================================================================
// SECTION: Digest
// ============================================================================

#[test]
fn unknown_operation_is_rejected() -> TestResult {
    assert_invalid(
        config_with("[digest]\norder_insensitive_operations = [\"resync\"]\n"),
        "digest.order_insensitive_operations",
    )
}

#[test]
fn malformed_ignored_path_is_rejected() -> TestResult {
    assert_invalid(config_with("[digest]\nignored_paths = [\"metadata..name\"]\n"), "digest.ignored_paths")?;
    assert_invalid(config_with("[digest]\nignored_paths = [\"\"]\n"), "digest.ignored_paths")
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

#[test]
fn artifact_names_must_stay_inside_result_dir() -> TestResult {
    assert_invalid(config_with("[artifacts]\nevent_log = \"../api-event.log\"\n"), "artifacts.event_log")?;
    assert_invalid(config_with("[artifacts]\nworkload_log = \"/var/log/workload.log\"\n"), "artifacts.workload_log")?;
    assert_invalid(config_with("[artifacts]\noperator_log = \"   \"\n"), "artifacts.operator_log must be non-empty")
}

#[test]
fn artifact_name_component_limit() -> TestResult {
    let long = "a".repeat(256);
    assert_invalid(config_with(&format!("[artifacts]\nresource_listing = \"{long}\"\n")), "path component too long")
}

#[test]
fn artifact_byte_limit_bounds() -> TestResult {
    assert_invalid(config_with("[artifacts]\nmax_artifact_bytes = 0\n"), "max_artifact_bytes")?;
    let over = MAX_ARTIFACT_BYTES_LIMIT + 1;
    assert_invalid(config_with(&format!("[artifacts]\nmax_artifact_bytes = {over}\n")), "max_artifact_bytes")?;
    config_with(&format!("[artifacts]\nmax_artifact_bytes = {MAX_ARTIFACT_BYTES_LIMIT}\n"))
        .map(|_| ())
        .map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Audit
// ============================================================================

#[test]
fn file_sink_requires_path() -> TestResult {
    assert_invalid(config_with("[audit]\nsink = \"file\"\n"), "audit.path is required")
}

#[test]
fn path_without_file_sink_is_rejected() -> TestResult {
    assert_invalid(config_with("[audit]\nsink = \"none\"\npath = \"audit.jsonl\"\n"), "only valid for the file sink")
}

#[test]
fn unknown_sink_is_rejected() -> TestResult {
    assert_invalid(config_with("[audit]\nsink = \"syslog\"\n"), "syslog")
}
