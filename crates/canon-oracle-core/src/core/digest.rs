// crates/canon-oracle-core/src/core/digest.rs
// ============================================================================
// Module: Canon Oracle History Digest
// Description: Normalized, comparison-ready projection of a history.
// Purpose: Hold per-object event signatures split by order sensitivity.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`HistoryDigest`] maps each object key to an [`ObjectDigest`]. Each
//! object digest keeps its order-sensitive signatures in observation order
//! and its order-insensitive signatures as a sorted multiset. Repeated
//! identical signatures are kept; multiplicity is significant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::baseline::ArtifactDigest;
use crate::core::event::Operation;
use crate::core::identifiers::ObjectKey;
use crate::core::path::FieldPath;
use crate::core::value::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of hex characters shown for a signature fingerprint.
const FINGERPRINT_LEN: usize = 12;

// ============================================================================
// SECTION: Signatures
// ============================================================================

/// Normalized event: operation plus unmasked observed fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventSignature {
    /// Operation observed.
    pub operation: Operation,
    /// Observed fields remaining after masking.
    pub fields: BTreeMap<FieldPath, Value>,
}

impl EventSignature {
    /// Returns a short stable fingerprint of the signature content.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = ArtifactDigest::of(self.to_string().as_bytes());
        digest.as_str().chars().take(FINGERPRINT_LEN).collect()
    }

    /// Returns a one-line label used in alarm messages.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}#{}", self.operation, self.fingerprint())
    }
}

impl fmt::Display for EventSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        for (path, value) in &self.fields {
            write!(f, "\n{path}={value}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Object Digest
// ============================================================================

/// Order classification of one object's event sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderClass {
    /// At least one event's relative position matters.
    Sensitive,
    /// Only the multiset of events matters.
    Insensitive,
}

/// Digest of one object's events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDigest {
    /// Order-sensitive signatures in observation order.
    pub ordered: Vec<EventSignature>,
    /// Order-insensitive signatures, sorted.
    pub unordered: Vec<EventSignature>,
}

impl ObjectDigest {
    /// Returns the order classification of the sequence.
    #[must_use]
    pub fn order_class(&self) -> OrderClass {
        if self.ordered.is_empty() { OrderClass::Insensitive } else { OrderClass::Sensitive }
    }

    /// Returns the total number of signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len() + self.unordered.len()
    }

    /// Returns true when no signatures are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty() && self.unordered.is_empty()
    }

    /// Returns every signature, ordered partition first.
    pub fn signatures(&self) -> impl Iterator<Item = &EventSignature> {
        self.ordered.iter().chain(&self.unordered)
    }
}

// ============================================================================
// SECTION: History Digest
// ============================================================================

/// Per-object digests for a whole history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryDigest(BTreeMap<ObjectKey, ObjectDigest>);

impl HistoryDigest {
    /// Wraps an existing per-object map.
    #[must_use]
    pub const fn new(objects: BTreeMap<ObjectKey, ObjectDigest>) -> Self {
        Self(objects)
    }

    /// Returns the per-object map.
    #[must_use]
    pub const fn objects(&self) -> &BTreeMap<ObjectKey, ObjectDigest> {
        &self.0
    }

    /// Returns the digest for `key`.
    #[must_use]
    pub fn get(&self, key: &ObjectKey) -> Option<&ObjectDigest> {
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
