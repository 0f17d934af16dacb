// crates/canon-oracle-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for canon-oracle-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use canon_oracle_config::ConfigError;
use canon_oracle_config::OracleConfig;

/// Result type for fallible tests.
pub type TestResult = Result<(), String>;

/// The `[checks]` table with every toggle enabled.
pub const ALL_CHECKS: &str = "[checks]
generic_event_generation_enabled = true
generic_state_generation_enabled = true
generic_event_checker_enabled = true
generic_state_checker_enabled = true
operator_checker_enabled = true
test_workload_checker_enabled = true
injection_desc_generation_enabled = true
";

/// Parses a TOML string into an `OracleConfig` without validation.
pub fn config_from_toml(toml_str: &str) -> Result<OracleConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config: all toggles on, every other section defaulted.
pub fn minimal_config() -> Result<OracleConfig, toml::de::Error> {
    config_from_toml(ALL_CHECKS)
}

/// Returns a config with extra sections appended to the checks table.
pub fn config_with(extra: &str) -> Result<OracleConfig, ConfigError> {
    OracleConfig::from_toml(&format!("{ALL_CHECKS}\n{extra}"))
}

/// Asserts that a result is an error containing a specific substring.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
