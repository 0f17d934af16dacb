// crates/canon-oracle-core/src/core/event.rs
// ============================================================================
// Module: Canon Oracle Events and Histories
// Description: Typed representation of the notifications a run produces.
// Purpose: Preserve per-object observation order for history comparison.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`Event`] records one operation observed against a tracked object along
//! with the object's flattened content at that moment. A [`History`] is the
//! run's ordered event sequence. Construction validates that sequence numbers
//! strictly increase; a history is never mutated afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::ParseError;
use crate::core::identifiers::ObjectKey;
use crate::core::path::FieldPath;
use crate::core::value::Value;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Operation observed against an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Object created.
    Create,
    /// Object replaced.
    Update,
    /// Object partially modified.
    Patch,
    /// Object deleted.
    Delete,
    /// Periodic reconciliation notification.
    Sync,
}

impl Operation {
    /// All operations in declaration order.
    pub const ALL: [Self; 5] = [Self::Create, Self::Update, Self::Patch, Self::Delete, Self::Sync];

    /// Returns the wire label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Sync => "sync",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|operation| operation.as_str().eq_ignore_ascii_case(input.trim()))
            .ok_or_else(|| ParseError::UnknownOperation(input.to_string()))
    }
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// One observed action against a tracked object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Identity of the affected object.
    pub object_key: ObjectKey,
    /// Operation observed.
    pub operation: Operation,
    /// Object content at the time of the event, flattened to leaves.
    pub observed_fields: BTreeMap<FieldPath, Value>,
    /// Position of the event within its history.
    pub sequence_number: u64,
}

impl Event {
    /// Builds an event from an observed object.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Identity`] when the object has no usable identity.
    pub fn from_object(
        operation: Operation,
        object: &Value,
        sequence_number: u64,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            object_key: ObjectKey::from_object(object)?,
            operation,
            observed_fields: object.leaves(),
            sequence_number,
        })
    }
}

// ============================================================================
// SECTION: Histories
// ============================================================================

/// Ordered event sequence for one run.
///
/// # Invariants
/// - Sequence numbers strictly increase across the whole history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Event>", into = "Vec<Event>")]
pub struct History {
    /// Events in observation order.
    events: Vec<Event>,
}

impl History {
    /// Builds a history after validating sequence ordering.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::History`] when sequence numbers do not strictly increase.
    pub fn new(events: Vec<Event>) -> Result<Self, ParseError> {
        for pair in events.windows(2) {
            if let [previous, next] = pair
                && next.sequence_number <= previous.sequence_number
            {
                return Err(ParseError::History(format!(
                    "sequence number {} follows {}",
                    next.sequence_number, previous.sequence_number
                )));
            }
        }
        Ok(Self { events })
    }

    /// Returns an empty history.
    #[must_use]
    pub const fn empty() -> Self {
        Self { events: Vec::new() }
    }

    /// Returns the events in observation order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Returns the number of events.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true when the history has no events.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl TryFrom<Vec<Event>> for History {
    type Error = ParseError;

    fn try_from(events: Vec<Event>) -> Result<Self, Self::Error> {
        Self::new(events)
    }
}

impl From<History> for Vec<Event> {
    fn from(history: History) -> Self {
        history.events
    }
}
