// crates/canon-oracle-core/src/core/alarm.rs
// ============================================================================
// Module: Canon Oracle Alarms
// Description: Structured findings and per-check results.
// Purpose: Represent violations as data that is collected, counted, and sorted.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`Alarm`] is one finding: a category tag and a message. Alarms are
//! never raised as control flow; every check returns a [`CheckResult`] that
//! carries a magnitude and a sorted alarm list. A magnitude of
//! [`VALIDATION_FAILURE`] marks a result whose comparison was skipped because
//! pre-check validation failed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Magnitude signalling that validation failed and comparisons were skipped.
pub const VALIDATION_FAILURE: i64 = -1;

// ============================================================================
// SECTION: Alarm Categories
// ============================================================================

/// Category tag carried by every alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlarmCategory {
    /// Expected event or object absent from the test run.
    #[serde(rename = "MISSING-EVENT")]
    MissingEvent,
    /// Event or object present only in the test run.
    #[serde(rename = "EXTRA-EVENT")]
    ExtraEvent,
    /// Order-sensitive events observed in a different order.
    #[serde(rename = "ORDER-VIOLATION")]
    OrderViolation,
    /// Final state differs from the canonical snapshot.
    #[serde(rename = "STATE-DIVERGENCE")]
    StateDivergence,
    /// Operator log reported a panic.
    #[serde(rename = "OPERATOR-PANIC")]
    OperatorPanic,
    /// Workload log reported an error.
    #[serde(rename = "WORKLOAD")]
    Workload,
    /// Pre-check validation or baseline integrity failed.
    #[serde(rename = "VALIDATION")]
    Validation,
    /// A run artifact could not be parsed.
    #[serde(rename = "PARSE-ERROR")]
    ParseError,
    /// Baselines disagree beyond the discovered mask.
    #[serde(rename = "CANONICALIZATION-WARNING")]
    CanonicalizationWarning,
}

impl AlarmCategory {
    /// Returns the bracketed tag text without brackets.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::MissingEvent => "MISSING-EVENT",
            Self::ExtraEvent => "EXTRA-EVENT",
            Self::OrderViolation => "ORDER-VIOLATION",
            Self::StateDivergence => "STATE-DIVERGENCE",
            Self::OperatorPanic => "OPERATOR-PANIC",
            Self::Workload => "WORKLOAD",
            Self::Validation => "VALIDATION",
            Self::ParseError => "PARSE-ERROR",
            Self::CanonicalizationWarning => "CANONICALIZATION-WARNING",
        }
    }
}

impl fmt::Display for AlarmCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.tag())
    }
}

// ============================================================================
// SECTION: Alarms
// ============================================================================

/// One structured finding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Alarm {
    /// Category tag.
    pub category: AlarmCategory,
    /// Human-readable description.
    pub message: String,
}

impl Alarm {
    /// Creates an alarm.
    #[must_use]
    pub fn new(category: AlarmCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category, self.message)
    }
}

// ============================================================================
// SECTION: Check Results
// ============================================================================

/// Magnitude and sorted alarms produced by one check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Violation magnitude, or [`VALIDATION_FAILURE`].
    pub violation_count: i64,
    /// Alarms in sorted order.
    pub messages: Vec<Alarm>,
}

impl CheckResult {
    /// Returns a clean result.
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            violation_count: 0,
            messages: Vec::new(),
        }
    }

    /// Returns a result counting one violation per alarm.
    #[must_use]
    pub fn from_alarms(mut alarms: Vec<Alarm>) -> Self {
        alarms.sort();
        Self {
            violation_count: count_of(&alarms),
            messages: alarms,
        }
    }

    /// Returns a zero-magnitude result that still reports alarms.
    #[must_use]
    pub fn advisory(mut alarms: Vec<Alarm>) -> Self {
        alarms.sort();
        Self {
            violation_count: 0,
            messages: alarms,
        }
    }

    /// Returns a validation failure carrying the given alarms.
    #[must_use]
    pub fn validation_failure(mut alarms: Vec<Alarm>) -> Self {
        alarms.sort();
        Self {
            violation_count: VALIDATION_FAILURE,
            messages: alarms,
        }
    }

    /// Returns true when the magnitude is negative.
    #[must_use]
    pub const fn is_validation_failure(&self) -> bool {
        self.violation_count < 0
    }

    /// Returns true when the magnitude is zero.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.violation_count == 0
    }

    /// Renders each alarm as `[TAG] message`.
    #[must_use]
    pub fn render_messages(&self) -> Vec<String> {
        self.messages.iter().map(ToString::to_string).collect()
    }
}

/// Converts an alarm count to a magnitude.
fn count_of(alarms: &[Alarm]) -> i64 {
    i64::try_from(alarms.len()).unwrap_or(i64::MAX)
}
