// crates/canon-oracle-core/src/runtime/history_check.rs
// ============================================================================
// Module: Canon Oracle Digest Comparator
// Description: Safety oracle comparing a run's history against the canonical digest.
// Purpose: Report missing, extra, and reordered events not explained by the mask.
// Dependencies: crate::core, crate::runtime::digest
// ============================================================================

//! ## Overview
//! For each object key present in either digest:
//! - an object absent from the test run yields one `[MISSING-EVENT]`, an
//!   object only in the test run yields one `[EXTRA-EVENT]`;
//! - within an object, each signature missing from the test multiset yields
//!   `[MISSING-EVENT]` and each surplus signature yields `[EXTRA-EVENT]`;
//! - for the order-sensitive partition, the signatures common to both sides
//!   are compared as sequences and any difference yields exactly one
//!   `[ORDER-VIOLATION]` for the object.
//!
//! Order-insensitive signatures are compared as multisets only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::Alarm;
use crate::core::AlarmCategory;
use crate::core::CheckResult;
use crate::core::EventSignature;
use crate::core::History;
use crate::core::HistoryDigest;
use crate::core::Mask;
use crate::core::ObjectDigest;
use crate::core::ObjectKey;
use crate::runtime::digest::DigestBuilder;

// ============================================================================
// SECTION: Comparator
// ============================================================================

/// Digests the test history under `mask` and compares it to `canonical`.
#[must_use]
pub fn compare_history(
    builder: &DigestBuilder,
    test: &History,
    canonical: &HistoryDigest,
    mask: &Mask,
) -> CheckResult {
    let digest = builder.build(test, mask);
    compare_digests(&digest, canonical)
}

/// Compares two already-masked digests.
#[must_use]
pub fn compare_digests(test: &HistoryDigest, canonical: &HistoryDigest) -> CheckResult {
    let keys: BTreeSet<&ObjectKey> =
        canonical.objects().keys().chain(test.objects().keys()).collect();
    let mut alarms = Vec::new();
    for key in keys {
        match (canonical.get(key), test.get(key)) {
            (Some(expected), Some(actual)) => compare_object(key, expected, actual, &mut alarms),
            (Some(expected), None) => alarms.push(Alarm::new(
                AlarmCategory::MissingEvent,
                format!("{key}: object missing from test run ({} expected events)", expected.len()),
            )),
            (None, Some(actual)) => alarms.push(Alarm::new(
                AlarmCategory::ExtraEvent,
                format!("{key}: unexpected object in test run ({} events)", actual.len()),
            )),
            (None, None) => {}
        }
    }
    CheckResult::from_alarms(alarms)
}

/// Compares the digests of one object present on both sides.
fn compare_object(
    key: &ObjectKey,
    expected: &ObjectDigest,
    actual: &ObjectDigest,
    alarms: &mut Vec<Alarm>,
) {
    multiset_diff(key, &expected.unordered, &actual.unordered, alarms);
    multiset_diff(key, &expected.ordered, &actual.ordered, alarms);

    let shared = intersection(&counts(&expected.ordered), &counts(&actual.ordered));
    let expected_common = common_subsequence(&expected.ordered, &shared);
    let actual_common = common_subsequence(&actual.ordered, &shared);
    if expected_common != actual_common {
        alarms.push(Alarm::new(
            AlarmCategory::OrderViolation,
            format!(
                "{key}: expected order [{}], observed [{}]",
                labels(&expected_common),
                labels(&actual_common)
            ),
        ));
    }
}

// ============================================================================
// SECTION: Multiset Helpers
// ============================================================================

/// Signature multiplicities.
type Counts<'a> = BTreeMap<&'a EventSignature, usize>;

/// Counts each signature.
fn counts(signatures: &[EventSignature]) -> Counts<'_> {
    let mut out = Counts::new();
    for signature in signatures {
        *out.entry(signature).or_insert(0) += 1;
    }
    out
}

/// Returns the per-signature minimum of two multisets.
fn intersection<'a>(left: &Counts<'a>, right: &Counts<'a>) -> Counts<'a> {
    left.iter()
        .filter_map(|(signature, count)| {
            right.get(signature).map(|other| (*signature, (*count).min(*other)))
        })
        .collect()
}

/// Emits one alarm per signature instance missing or surplus in `actual`.
fn multiset_diff(
    key: &ObjectKey,
    expected: &[EventSignature],
    actual: &[EventSignature],
    alarms: &mut Vec<Alarm>,
) {
    let expected_counts = counts(expected);
    let actual_counts = counts(actual);
    for (signature, count) in &expected_counts {
        let observed = actual_counts.get(signature).copied().unwrap_or(0);
        for _ in observed .. *count {
            alarms.push(Alarm::new(
                AlarmCategory::MissingEvent,
                format!("{key}: missing {} event {}", signature.operation, signature.label()),
            ));
        }
    }
    for (signature, count) in &actual_counts {
        let wanted = expected_counts.get(signature).copied().unwrap_or(0);
        for _ in wanted .. *count {
            alarms.push(Alarm::new(
                AlarmCategory::ExtraEvent,
                format!("{key}: extra {} event {}", signature.operation, signature.label()),
            ));
        }
    }
}

/// Keeps, in order, the first `shared[s]` occurrences of each signature.
fn common_subsequence<'a>(
    sequence: &'a [EventSignature],
    shared: &Counts<'_>,
) -> Vec<&'a EventSignature> {
    let mut remaining: BTreeMap<&EventSignature, usize> =
        shared.iter().map(|(signature, count)| (*signature, *count)).collect();
    let mut out = Vec::new();
    for signature in sequence {
        if let Some(left) = remaining.get_mut(signature)
            && *left > 0
        {
            *left -= 1;
            out.push(signature);
        }
    }
    out
}

/// Joins signature labels for messages.
fn labels(signatures: &[&EventSignature]) -> String {
    signatures.iter().map(|signature| signature.label()).collect::<Vec<_>>().join(", ")
}
