//! Load tests for canon-oracle-config.
// crates/canon-oracle-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Tests
// Description: Tests for reading configuration files from disk.
// Purpose: Ensure size, encoding, and path limits are enforced when loading.
// =============================================================================

use std::fs;

use canon_oracle_config::ConfigError;
use canon_oracle_config::MAX_CONFIG_FILE_SIZE;
use canon_oracle_config::OracleConfig;
use tempfile::TempDir;

mod common;

use crate::common::ALL_CHECKS;
use crate::common::TestResult;
use crate::common::assert_invalid;

#[test]
fn load_reads_explicit_path() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("canon-oracle.toml");
    fs::write(&path, ALL_CHECKS).map_err(|err| err.to_string())?;
    let config = OracleConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if !config.checks.operator_checker_enabled {
        return Err("toggle not loaded".to_string());
    }
    Ok(())
}

#[test]
fn load_missing_file_is_io_error() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let result = OracleConfig::load(Some(&dir.path().join("absent.toml")));
    if matches!(result, Err(ConfigError::Io(_))) {
        Ok(())
    } else {
        Err("expected io error".to_string())
    }
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("big.toml");
    let padding = "#".repeat(MAX_CONFIG_FILE_SIZE);
    fs::write(&path, format!("{ALL_CHECKS}{padding}")).map_err(|err| err.to_string())?;
    assert_invalid(OracleConfig::load(Some(&path)), "size limit")
}

#[test]
fn load_rejects_non_utf8() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("binary.toml");
    fs::write(&path, [0xff, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    assert_invalid(OracleConfig::load(Some(&path)), "utf-8")
}

#[test]
fn load_rejects_long_path_component() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join(format!("{}.toml", "c".repeat(300)));
    assert_invalid(OracleConfig::load(Some(&path)), "component too long")
}

#[test]
fn file_audit_sink_is_built() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let log = dir.path().join("audit.jsonl");
    let toml = format!("{ALL_CHECKS}\n[audit]\nsink = \"file\"\npath = \"{}\"\n", log.display());
    let config = OracleConfig::from_toml(&toml).map_err(|err| err.to_string())?;
    let _sink = config.audit_sink().map_err(|err| err.to_string())?;
    if !log.exists() {
        return Err("file sink should create the audit log".to_string());
    }
    Ok(())
}
