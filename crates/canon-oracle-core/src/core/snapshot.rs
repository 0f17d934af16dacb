// crates/canon-oracle-core/src/core/snapshot.rs
// ============================================================================
// Module: Canon Oracle State Snapshots
// Description: Final observable resource state of one run.
// Purpose: Capture every tracked object's full content at run end.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`StateSnapshot`] maps each object key to the object's final content.
//! Keys are unique; building a snapshot from a listing that names the same
//! object twice is rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::ParseError;
use crate::core::identifiers::ObjectKey;
use crate::core::value::Value;

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Final content of every tracked object, keyed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSnapshot(BTreeMap<ObjectKey, Value>);

impl StateSnapshot {
    /// Wraps an existing object map.
    #[must_use]
    pub const fn new(objects: BTreeMap<ObjectKey, Value>) -> Self {
        Self(objects)
    }

    /// Builds a snapshot from listed objects, deriving each key from content.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when an object lacks an identity or when two
    /// objects share a key.
    pub fn from_objects(objects: impl IntoIterator<Item = Value>) -> Result<Self, ParseError> {
        let mut out = BTreeMap::new();
        for object in objects {
            let key = ObjectKey::from_object(&object)?;
            if out.contains_key(&key) {
                return Err(ParseError::Snapshot(format!("duplicate object {key}")));
            }
            out.insert(key, object);
        }
        Ok(Self(out))
    }

    /// Returns the object map.
    #[must_use]
    pub const fn objects(&self) -> &BTreeMap<ObjectKey, Value> {
        &self.0
    }

    /// Returns the content recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &ObjectKey) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no objects are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
