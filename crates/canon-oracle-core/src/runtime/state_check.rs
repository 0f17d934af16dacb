// crates/canon-oracle-core/src/runtime/state_check.rs
// ============================================================================
// Module: Canon Oracle State Comparator
// Description: Recursive comparison of final state against the canonical snapshot.
// Purpose: Report unexplained divergence in a run's terminal resource state.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The state comparator walks both snapshots in lock-step, first by object
//! key and then by field path. Masked nodes are skipped with their whole
//! subtree. Every other difference yields a `[STATE-DIVERGENCE]` alarm:
//! - one alarm per object present on only one side,
//! - one alarm per unmasked leaf of a subtree present on only one side,
//! - one alarm per differing scalar or per node whose shape differs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::Alarm;
use crate::core::AlarmCategory;
use crate::core::CheckResult;
use crate::core::FieldPath;
use crate::core::Mask;
use crate::core::ObjectKey;
use crate::core::StateSnapshot;
use crate::core::Value;

// ============================================================================
// SECTION: Comparator
// ============================================================================

/// Compares a test snapshot against the canonical snapshot under `mask`.
#[must_use]
pub fn compare_state(test: &StateSnapshot, canonical: &StateSnapshot, mask: &Mask) -> CheckResult {
    let keys: BTreeSet<&ObjectKey> =
        canonical.objects().keys().chain(test.objects().keys()).collect();
    let mut alarms = Vec::new();
    for key in keys {
        match (canonical.get(key), test.get(key)) {
            (Some(expected), Some(actual)) => {
                alarms.extend(diff_object(key, expected, actual, mask));
            }
            (Some(_), None) => alarms.push(divergence(format!("{key}: object missing from test run"))),
            (None, Some(_)) => {
                alarms.push(divergence(format!("{key}: unexpected object in test run")));
            }
            (None, None) => {}
        }
    }
    CheckResult::from_alarms(alarms)
}

/// Returns the divergence alarms between two versions of one object.
#[must_use]
pub fn diff_object(key: &ObjectKey, expected: &Value, actual: &Value, mask: &Mask) -> Vec<Alarm> {
    let mut walker = Walker {
        key,
        mask,
        alarms: Vec::new(),
    };
    let mut cursor = FieldPath::root();
    walker.walk(Some(expected), Some(actual), &mut cursor);
    walker.alarms
}

// ============================================================================
// SECTION: Walker
// ============================================================================

/// Lock-step walk state for one object.
struct Walker<'a> {
    /// Object being compared.
    key: &'a ObjectKey,
    /// Active mask.
    mask: &'a Mask,
    /// Alarms collected so far.
    alarms: Vec<Alarm>,
}

impl Walker<'_> {
    /// Compares the nodes at `cursor` on both sides.
    fn walk(&mut self, expected: Option<&Value>, actual: Option<&Value>, cursor: &mut FieldPath) {
        if !cursor.is_root() && self.mask.matches(cursor) {
            return;
        }
        match (expected, actual) {
            (Some(Value::Mapping(left)), Some(Value::Mapping(right))) => {
                let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
                for key in keys {
                    cursor.push_key(key);
                    self.walk(left.get(key), right.get(key), cursor);
                    cursor.pop();
                }
            }
            (Some(Value::Sequence(left)), Some(Value::Sequence(right))) => {
                for index in 0 .. left.len().max(right.len()) {
                    cursor.push_index(index);
                    self.walk(left.get(index), right.get(index), cursor);
                    cursor.pop();
                }
            }
            (Some(left @ Value::Scalar(_)), Some(right @ Value::Scalar(_))) => {
                if left != right {
                    self.push(format!("{}: expected {left}, found {right}", render(cursor)));
                }
            }
            (Some(left), Some(right)) => {
                self.push(format!(
                    "{}: expected {}, found {}",
                    render(cursor),
                    left.kind_label(),
                    right.kind_label()
                ));
            }
            (Some(left), None) => self.one_sided(left, cursor, "missing from test run"),
            (None, Some(right)) => self.one_sided(right, cursor, "unexpected in test run"),
            (None, None) => {}
        }
    }

    /// Reports every unmasked leaf of a subtree present on one side only.
    fn one_sided(&mut self, value: &Value, cursor: &FieldPath, reason: &str) {
        for (leaf, leaf_value) in value.leaves() {
            let path = cursor.join(&leaf);
            if self.mask.covers(&path) {
                continue;
            }
            self.push(format!("{}: {leaf_value} {reason}", render(&path)));
        }
    }

    /// Records one divergence for the current object.
    fn push(&mut self, detail: String) {
        self.alarms.push(divergence(format!("{}: {detail}", self.key)));
    }
}

/// Builds a state divergence alarm.
fn divergence(message: String) -> Alarm {
    Alarm::new(AlarmCategory::StateDivergence, message)
}

/// Renders a path for messages.
fn render(path: &FieldPath) -> String {
    if path.is_root() { "<root>".to_string() } else { path.to_string() }
}
