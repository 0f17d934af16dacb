// crates/canon-oracle-core/src/runtime/scanners.rs
// ============================================================================
// Module: Canon Oracle Log Scanners
// Description: Substring scanners over the operator and workload logs.
// Purpose: Fold operator panics and workload errors into the verdict.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Both scanners report one alarm per matching line and count one violation
//! per alarm.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Alarm;
use crate::core::AlarmCategory;
use crate::core::CheckResult;
use crate::interfaces::LogScanner;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Text marking a recovered panic in the operator log.
pub const PANIC_MARKER: &str = "Observed a panic";
/// Prefix marking an error line in the workload log.
pub const WORKLOAD_ERROR_PREFIX: &str = "error:";

// ============================================================================
// SECTION: Operator Panic Scanner
// ============================================================================

/// Reports operator log lines containing [`PANIC_MARKER`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorPanicScanner;

impl LogScanner for OperatorPanicScanner {
    fn name(&self) -> &'static str {
        "operator_panic"
    }

    fn scan(&self, log: &str) -> CheckResult {
        let alarms = log
            .lines()
            .filter_map(|line| line.find(PANIC_MARKER).map(|start| &line[start ..]))
            .map(|text| Alarm::new(AlarmCategory::OperatorPanic, text.trim_end()))
            .collect();
        CheckResult::from_alarms(alarms)
    }
}

// ============================================================================
// SECTION: Workload Error Scanner
// ============================================================================

/// Reports workload log lines starting with [`WORKLOAD_ERROR_PREFIX`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkloadErrorScanner;

impl LogScanner for WorkloadErrorScanner {
    fn name(&self) -> &'static str {
        "workload_error"
    }

    fn scan(&self, log: &str) -> CheckResult {
        let alarms = log
            .lines()
            .filter(|line| line.starts_with(WORKLOAD_ERROR_PREFIX))
            .map(|line| Alarm::new(AlarmCategory::Workload, line.trim_end()))
            .collect();
        CheckResult::from_alarms(alarms)
    }
}
