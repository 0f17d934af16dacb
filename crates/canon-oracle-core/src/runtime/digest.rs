// crates/canon-oracle-core/src/runtime/digest.rs
// ============================================================================
// Module: Canon Oracle Digest Builder
// Description: Normalizes a history into a comparison-ready digest.
// Purpose: Strip masked structure and classify per-object event order.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Digesting is a pure function of a history, a learned mask, and a
//! [`DigestPolicy`]. For every object the builder walks its events in
//! history order, removes covered field paths, and files each signature
//! into the ordered or unordered partition according to the
//! [`OrderPolicy`]. The policy's static ignored paths are stripped even
//! from the raw (empty-mask) digest.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::Event;
use crate::core::EventSignature;
use crate::core::History;
use crate::core::HistoryDigest;
use crate::core::Mask;
use crate::core::ObjectDigest;
use crate::core::ObjectKey;
use crate::core::Operation;

// ============================================================================
// SECTION: Order Policy
// ============================================================================

/// Operation table deciding which events keep their relative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPolicy {
    /// Operations whose relative order is insignificant.
    insensitive: BTreeSet<Operation>,
}

impl OrderPolicy {
    /// Builds a policy from the set of order-insensitive operations.
    #[must_use]
    pub fn new(insensitive: impl IntoIterator<Item = Operation>) -> Self {
        Self {
            insensitive: insensitive.into_iter().collect(),
        }
    }

    /// Returns true when events with `operation` keep their relative order.
    #[must_use]
    pub fn is_order_sensitive(&self, operation: Operation) -> bool {
        !self.insensitive.contains(&operation)
    }

    /// Returns the order-insensitive operations.
    pub fn insensitive(&self) -> impl Iterator<Item = Operation> + '_ {
        self.insensitive.iter().copied()
    }
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self::new([Operation::Sync])
    }
}

/// Static digesting policy shared by every run of a scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestPolicy {
    /// Order-sensitivity table.
    pub order: OrderPolicy,
    /// Field patterns always stripped, independent of the learned mask.
    pub ignored: Mask,
}

impl DigestPolicy {
    /// Returns the union of the static ignored paths and a learned mask.
    #[must_use]
    pub fn effective_mask(&self, learned: &Mask) -> Mask {
        self.ignored.union(learned)
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds history digests under a fixed policy.
#[derive(Debug, Clone, Default)]
pub struct DigestBuilder {
    /// Policy applied to every build.
    policy: DigestPolicy,
}

impl DigestBuilder {
    /// Creates a builder for the given policy.
    #[must_use]
    pub const fn new(policy: DigestPolicy) -> Self {
        Self {
            policy,
        }
    }

    /// Returns the builder policy.
    #[must_use]
    pub const fn policy(&self) -> &DigestPolicy {
        &self.policy
    }

    /// Builds the digest of `history` with `mask` applied.
    #[must_use]
    pub fn build(&self, history: &History, mask: &Mask) -> HistoryDigest {
        let mask = self.policy.effective_mask(mask);
        let mut objects: BTreeMap<ObjectKey, ObjectDigest> = BTreeMap::new();
        for event in history.events() {
            let signature = signature_of(event, &mask);
            let digest = objects.entry(event.object_key.clone()).or_default();
            if self.policy.order.is_order_sensitive(event.operation) {
                digest.ordered.push(signature);
            } else {
                digest.unordered.push(signature);
            }
        }
        for digest in objects.values_mut() {
            digest.unordered.sort();
        }
        HistoryDigest::new(objects)
    }

    /// Builds the raw digest used as canonicalization input.
    #[must_use]
    pub fn build_raw(&self, history: &History) -> HistoryDigest {
        self.build(history, &Mask::empty())
    }
}

/// Builds a digest under the default policy.
#[must_use]
pub fn build_digest(history: &History, mask: &Mask) -> HistoryDigest {
    DigestBuilder::default().build(history, mask)
}

/// Returns the masked signature of one event.
fn signature_of(event: &Event, mask: &Mask) -> EventSignature {
    EventSignature {
        operation: event.operation,
        fields: mask.strip_fields(&event.observed_fields),
    }
}
