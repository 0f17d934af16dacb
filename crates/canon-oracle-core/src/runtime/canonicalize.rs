// crates/canon-oracle-core/src/runtime/canonicalize.rs
// ============================================================================
// Module: Canon Oracle Canonicalizer
// Description: Derives the canonical baseline and mask from two baseline runs.
// Purpose: Discover non-deterministic fields by diffing two known-good executions.
// Dependencies: crate::core, crate::runtime::{digest, state_check}
// ============================================================================

//! ## Overview
//! Given two runs of the same scenario, the canonicalizer:
//! 1. builds both raw digests;
//! 2. aligns each object's events, by position for the ordered partition and,
//!    for the unordered partition, per operation: identical signatures pair
//!    first, then each remaining event pairs with its nearest counterpart;
//! 3. adds the generalized form of every field path whose value or presence
//!    differs between aligned events to the mask;
//! 4. repeats the alignment and diff over both final snapshots;
//! 5. emits baseline 1 with the mask applied as the canonical baseline.
//!
//! Objects seen in only one run, events that cannot be aligned, and a failed
//! post-condition (both runs must agree once masked) each raise a
//! `[CANONICALIZATION-WARNING]`. Canonicalization always completes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::Alarm;
use crate::core::AlarmCategory;
use crate::core::CheckResult;
use crate::core::EventSignature;
use crate::core::FieldPath;
use crate::core::History;
use crate::core::HistoryDigest;
use crate::core::Mask;
use crate::core::ObjectDigest;
use crate::core::ObjectKey;
use crate::core::Operation;
use crate::core::StateSnapshot;
use crate::core::Value;
use crate::runtime::digest::DigestBuilder;
use crate::runtime::state_check::diff_object;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Raw artifacts of one baseline execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineRun {
    /// Raw history.
    pub history: History,
    /// Final snapshot.
    pub snapshot: StateSnapshot,
}

/// Canonical artifacts derived from two baseline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalBaseline {
    /// Canonical history digest.
    pub digest: HistoryDigest,
    /// Canonical snapshot with masked content pruned.
    pub snapshot: StateSnapshot,
    /// Learned mask.
    pub mask: Mask,
    /// Canonicalization warnings.
    pub warnings: Vec<Alarm>,
}

impl CanonicalBaseline {
    /// Returns the warnings as a zero-magnitude result.
    #[must_use]
    pub fn warning_result(&self) -> CheckResult {
        CheckResult::advisory(self.warnings.clone())
    }
}

// ============================================================================
// SECTION: Canonicalizer
// ============================================================================

/// Merges two baseline runs into one canonical baseline.
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer {
    /// Digest builder shared with the comparators.
    builder: DigestBuilder,
}

impl Canonicalizer {
    /// Creates a canonicalizer using `builder` for every digest.
    #[must_use]
    pub const fn new(builder: DigestBuilder) -> Self {
        Self {
            builder,
        }
    }

    /// Derives the canonical baseline from two baseline runs.
    #[must_use]
    pub fn canonicalize(&self, first: &BaselineRun, second: &BaselineRun) -> CanonicalBaseline {
        let mut session = Session {
            ignored: &self.builder.policy().ignored,
            mask: Mask::empty(),
            warnings: Vec::new(),
        };

        let raw_first = self.builder.build_raw(&first.history);
        let raw_second = self.builder.build_raw(&second.history);
        session.learn_digests(&raw_first, &raw_second);
        session.learn_snapshots(&first.snapshot, &second.snapshot);

        let Session {
            mask,
            mut warnings,
            ..
        } = session;

        let digest = self.builder.build(&first.history, &mask);
        let second_digest = self.builder.build(&second.history, &mask);
        let effective = self.builder.policy().effective_mask(&mask);
        warnings.extend(digest_postcondition(&digest, &second_digest));
        warnings.extend(snapshot_postcondition(&first.snapshot, &second.snapshot, &effective));

        let snapshot = StateSnapshot::new(
            first
                .snapshot
                .objects()
                .iter()
                .map(|(key, value)| (key.clone(), effective.prune(value)))
                .collect(),
        );
        warnings.sort();
        CanonicalBaseline {
            digest,
            snapshot,
            mask,
            warnings,
        }
    }
}

// ============================================================================
// SECTION: Learning Session
// ============================================================================

/// Mutable state accumulated while diffing two baselines.
struct Session<'a> {
    /// Static ignored paths, never added to the learned mask.
    ignored: &'a Mask,
    /// Learned mask.
    mask: Mask,
    /// Warnings raised so far.
    warnings: Vec<Alarm>,
}

impl Session<'_> {
    /// Learns mask entries from two raw digests.
    fn learn_digests(&mut self, first: &HistoryDigest, second: &HistoryDigest) {
        let keys: BTreeSet<&ObjectKey> =
            first.objects().keys().chain(second.objects().keys()).collect();
        for key in keys {
            match (first.get(key), second.get(key)) {
                (Some(left), Some(right)) => self.learn_object_events(key, left, right),
                (Some(_), None) | (None, Some(_)) => {
                    self.warn(format!("{key}: events observed in only one baseline"));
                }
                (None, None) => {}
            }
        }
    }

    /// Aligns and diffs the events of one object.
    fn learn_object_events(&mut self, key: &ObjectKey, first: &ObjectDigest, second: &ObjectDigest) {
        if first.ordered.len() != second.ordered.len() {
            self.warn(format!(
                "{key}: ordered event counts differ ({} vs {})",
                first.ordered.len(),
                second.ordered.len()
            ));
        }
        for (position, (left, right)) in first.ordered.iter().zip(&second.ordered).enumerate() {
            if left.operation == right.operation {
                self.learn_fields(&left.fields, &right.fields);
            } else {
                self.warn(format!(
                    "{key}: ordered event {position} is {} in one baseline and {} in the other",
                    left.operation, right.operation
                ));
            }
        }

        let left_groups = group_by_operation(&first.unordered);
        let right_groups = group_by_operation(&second.unordered);
        let operations: BTreeSet<Operation> =
            left_groups.keys().chain(right_groups.keys()).copied().collect();
        for operation in operations {
            let left = left_groups.get(&operation).map_or(&[][..], Vec::as_slice);
            let right = right_groups.get(&operation).map_or(&[][..], Vec::as_slice);
            if left.len() != right.len() {
                self.warn(format!(
                    "{key}: {operation} event counts differ ({} vs {})",
                    left.len(),
                    right.len()
                ));
            }
            for (left, right) in align_unordered(left, right) {
                self.learn_fields(&left.fields, &right.fields);
            }
        }
    }

    /// Masks every path whose value or presence differs.
    fn learn_fields(&mut self, left: &BTreeMap<FieldPath, Value>, right: &BTreeMap<FieldPath, Value>) {
        let paths: BTreeSet<&FieldPath> = left.keys().chain(right.keys()).collect();
        for path in paths {
            if left.get(path) != right.get(path) {
                self.learn_path(path);
            }
        }
    }

    /// Learns mask entries from two final snapshots.
    fn learn_snapshots(&mut self, first: &StateSnapshot, second: &StateSnapshot) {
        let keys: BTreeSet<&ObjectKey> =
            first.objects().keys().chain(second.objects().keys()).collect();
        for key in keys {
            match (first.get(key), second.get(key)) {
                (Some(left), Some(right)) => {
                    let mut cursor = FieldPath::root();
                    self.learn_value(left, right, &mut cursor);
                }
                (Some(_), None) | (None, Some(_)) => {
                    self.warn(format!("{key}: final state present in only one baseline"));
                }
                (None, None) => {}
            }
        }
    }

    /// Walks two values in lock-step, masking the first differing node on each branch.
    fn learn_value(&mut self, left: &Value, right: &Value, cursor: &mut FieldPath) {
        match (left, right) {
            (Value::Mapping(left), Value::Mapping(right)) => {
                let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
                for key in keys {
                    cursor.push_key(key);
                    match (left.get(key), right.get(key)) {
                        (Some(left), Some(right)) => self.learn_value(left, right, cursor),
                        _ => self.learn_path(cursor),
                    }
                    cursor.pop();
                }
            }
            (Value::Sequence(left), Value::Sequence(right)) => {
                for index in 0 .. left.len().max(right.len()) {
                    cursor.push_index(index);
                    match (left.get(index), right.get(index)) {
                        (Some(left), Some(right)) => self.learn_value(left, right, cursor),
                        _ => self.learn_path(cursor),
                    }
                    cursor.pop();
                }
            }
            _ => {
                if left != right {
                    self.learn_path(cursor);
                }
            }
        }
    }

    /// Adds the generalized form of `path` unless statically ignored.
    fn learn_path(&mut self, path: &FieldPath) {
        if self.ignored.covers(path) {
            return;
        }
        if let Some(pattern) = path.generalize() {
            self.mask.insert(pattern);
        }
    }

    /// Records a canonicalization warning.
    fn warn(&mut self, message: String) {
        self.warnings.push(warning(message));
    }
}

// ============================================================================
// SECTION: Post-Conditions
// ============================================================================

/// Warns for each shared object whose masked digests still differ.
fn digest_postcondition(first: &HistoryDigest, second: &HistoryDigest) -> Vec<Alarm> {
    first
        .objects()
        .iter()
        .filter_map(|(key, left)| {
            let right = second.get(key)?;
            (left != right).then(|| {
                warning(format!("{key}: baselines disagree on history beyond the learned mask"))
            })
        })
        .collect()
}

/// Warns for each shared object whose masked final states still differ.
fn snapshot_postcondition(first: &StateSnapshot, second: &StateSnapshot, mask: &Mask) -> Vec<Alarm> {
    first
        .objects()
        .iter()
        .filter_map(|(key, left)| {
            let right = second.get(key)?;
            let divergent = diff_object(key, left, right, mask).len();
            (divergent > 0).then(|| {
                warning(format!(
                    "{key}: baselines disagree on {divergent} state leaves beyond the learned mask"
                ))
            })
        })
        .collect()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Groups sorted signatures by operation, preserving sorted order.
fn group_by_operation(signatures: &[EventSignature]) -> BTreeMap<Operation, Vec<&EventSignature>> {
    let mut groups: BTreeMap<Operation, Vec<&EventSignature>> = BTreeMap::new();
    for signature in signatures {
        groups.entry(signature.operation).or_default().push(signature);
    }
    groups
}

/// Pairs order-insensitive signatures of one operation across two baselines.
///
/// Identical signatures pair first. Each remaining left signature then takes
/// the remaining right signature with the fewest differing fields, so noise
/// never decides which events are compared. Surplus signatures stay unpaired.
fn align_unordered<'a>(
    left: &[&'a EventSignature],
    right: &[&'a EventSignature],
) -> Vec<(&'a EventSignature, &'a EventSignature)> {
    let mut pairs = Vec::new();
    let mut open_right: Vec<&EventSignature> = right.to_vec();
    let mut open_left = Vec::new();
    for &signature in left {
        match open_right.iter().position(|candidate| *candidate == signature) {
            Some(index) => {
                open_right.remove(index);
                pairs.push((signature, signature));
            }
            None => open_left.push(signature),
        }
    }
    for signature in open_left {
        let nearest = open_right
            .iter()
            .enumerate()
            .min_by_key(|(index, candidate)| (field_distance(signature, candidate), *index))
            .map(|(index, _)| index);
        let Some(index) = nearest else {
            break;
        };
        pairs.push((signature, open_right.remove(index)));
    }
    pairs
}

/// Counts the field paths whose value or presence differs between two signatures.
fn field_distance(left: &EventSignature, right: &EventSignature) -> usize {
    let paths: BTreeSet<&FieldPath> = left.fields.keys().chain(right.fields.keys()).collect();
    paths.into_iter().filter(|path| left.fields.get(*path) != right.fields.get(*path)).count()
}

/// Builds a canonicalization warning alarm.
fn warning(message: String) -> Alarm {
    Alarm::new(AlarmCategory::CanonicalizationWarning, message)
}
