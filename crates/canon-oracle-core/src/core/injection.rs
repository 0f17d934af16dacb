// crates/canon-oracle-core/src/core/injection.rs
// ============================================================================
// Module: Canon Oracle Injection Metadata
// Description: Fault-injection record written by the test harness.
// Purpose: Describe which injected actions a run planned and which fired.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The harness writes an [`InjectionRecord`] per run. Pre-check validation
//! uses it to decide whether a run's comparison is meaningful, and debugging
//! hints summarise it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Fault-injection metadata for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionRecord {
    /// Name of the injection plan executed.
    pub test_plan: String,
    /// Actions the plan scheduled.
    pub actions: Vec<InjectionAction>,
}

/// One scheduled injection action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionAction {
    /// Action description.
    pub action: String,
    /// Whether the action actually fired during the run.
    pub fired: bool,
}

impl InjectionRecord {
    /// Returns the actions that never fired.
    pub fn unfired(&self) -> impl Iterator<Item = &InjectionAction> {
        self.actions.iter().filter(|action| !action.fired)
    }
}
