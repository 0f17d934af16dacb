// crates/canon-oracle-core/src/core/mask.rs
// ============================================================================
// Module: Canon Oracle Mask
// Description: Set of field patterns excluded from comparison.
// Purpose: Suppress known non-deterministic content during digesting and diffing.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Mask`] is a set of [`FieldPattern`] entries. A path is *covered* when
//! the path itself or any of its ancestors matches an entry, so masking a
//! mapping hides everything beneath it. The mask serializes as a sorted JSON
//! list of pattern strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::path::FieldPath;
use crate::core::path::FieldPattern;
use crate::core::value::Value;

// ============================================================================
// SECTION: Mask
// ============================================================================

/// Field patterns ignored during comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mask(BTreeSet<FieldPattern>);

impl Mask {
    /// Returns an empty mask.
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Adds one pattern. Returns true when it was not already present.
    pub fn insert(&mut self, pattern: FieldPattern) -> bool {
        self.0.insert(pattern)
    }

    /// Returns the union of two masks.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self(self.0.union(&other.0).cloned().collect())
    }

    /// Returns the patterns in sorted order.
    pub fn patterns(&self) -> impl Iterator<Item = &FieldPattern> {
        self.0.iter()
    }

    /// Returns true when the mask holds no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when some pattern matches `path` exactly at its tail.
    #[must_use]
    pub fn matches(&self, path: &FieldPath) -> bool {
        self.0.iter().any(|pattern| pattern.matches(path))
    }

    /// Returns true when `path` or one of its ancestors is masked.
    #[must_use]
    pub fn covers(&self, path: &FieldPath) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let segments = path.segments();
        (1 ..= segments.len()).any(|end| {
            let prefix = &segments[.. end];
            self.0.iter().any(|pattern| pattern.matches_segments(prefix))
        })
    }

    /// Returns the entries of `fields` whose paths are not covered.
    #[must_use]
    pub fn strip_fields(&self, fields: &BTreeMap<FieldPath, Value>) -> BTreeMap<FieldPath, Value> {
        fields
            .iter()
            .filter(|(path, _)| !self.covers(path))
            .map(|(path, value)| (path.clone(), value.clone()))
            .collect()
    }

    /// Returns a copy of `value` with covered content removed.
    ///
    /// Masked mapping entries are dropped. Masked sequence elements are
    /// replaced with null so later indices keep their positions.
    #[must_use]
    pub fn prune(&self, value: &Value) -> Value {
        let mut cursor = FieldPath::root();
        self.prune_at(value, &mut cursor)
    }

    /// Prunes `value`, which sits at `cursor`.
    fn prune_at(&self, value: &Value, cursor: &mut FieldPath) -> Value {
        match value {
            Value::Mapping(entries) => {
                let mut out = BTreeMap::new();
                for (key, child) in entries {
                    cursor.push_key(key);
                    if !self.matches(cursor) {
                        out.insert(key.clone(), self.prune_at(child, cursor));
                    }
                    cursor.pop();
                }
                Value::Mapping(out)
            }
            Value::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, child) in items.iter().enumerate() {
                    cursor.push_index(index);
                    if self.matches(cursor) {
                        out.push(Value::null());
                    } else {
                        out.push(self.prune_at(child, cursor));
                    }
                    cursor.pop();
                }
                Value::Sequence(out)
            }
            Value::Scalar(_) => value.clone(),
        }
    }
}

impl Extend<FieldPattern> for Mask {
    fn extend<T: IntoIterator<Item = FieldPattern>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl FromIterator<FieldPattern> for Mask {
    fn from_iter<T: IntoIterator<Item = FieldPattern>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
