// crates/canon-oracle-core/src/runtime/validation.rs
// ============================================================================
// Module: Canon Oracle Injection Validation
// Description: Pre-check validation of fault-injection metadata.
// Purpose: Short-circuit comparisons when the injected fault did not happen.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! A test run is only meaningful when its fault-injection plan actually
//! executed. [`InjectionValidator`] fails with the negative sentinel when the
//! metadata is missing or malformed, lists no actions, or records an action
//! that never fired. Baseline modes skip validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Alarm;
use crate::core::AlarmCategory;
use crate::core::CheckResult;
use crate::core::InjectionRecord;
use crate::core::RunMode;
use crate::interfaces::PrecheckValidator;

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validates `injection.json` metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectionValidator;

impl PrecheckValidator for InjectionValidator {
    fn validate(&self, mode: RunMode, metadata: Option<&[u8]>) -> CheckResult {
        if mode.is_learning() {
            return CheckResult::pass();
        }
        let record = match decode(metadata) {
            Ok(record) => record,
            Err(reason) => return CheckResult::validation_failure(vec![validation(reason)]),
        };
        if record.actions.is_empty() {
            return CheckResult::validation_failure(vec![validation(format!(
                "injection plan {} lists no actions",
                record.test_plan
            ))]);
        }
        let unfired: Vec<Alarm> = record
            .unfired()
            .map(|action| {
                validation(format!(
                    "injection plan {}: action `{}` never fired",
                    record.test_plan, action.action
                ))
            })
            .collect();
        if unfired.is_empty() { CheckResult::pass() } else { CheckResult::validation_failure(unfired) }
    }

    fn describe(&self, metadata: Option<&[u8]>) -> Option<String> {
        decode(metadata).ok().map(|record| describe_injection(&record))
    }
}

/// Summarises an injection record as a debugging hint.
#[must_use]
pub fn describe_injection(record: &InjectionRecord) -> String {
    let actions = record
        .actions
        .iter()
        .map(|action| {
            format!("{} ({})", action.action, if action.fired { "fired" } else { "not fired" })
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!("injection plan {}: {actions}", record.test_plan)
}

/// Decodes the metadata bytes.
fn decode(metadata: Option<&[u8]>) -> Result<InjectionRecord, String> {
    let bytes = metadata.ok_or_else(|| "injection metadata missing".to_string())?;
    serde_json::from_slice(bytes).map_err(|err| format!("injection metadata malformed: {err}"))
}

/// Builds a validation alarm.
fn validation(message: String) -> Alarm {
    Alarm::new(AlarmCategory::Validation, message)
}
