// crates/canon-oracle-core/src/core/error.rs
// ============================================================================
// Module: Canon Oracle Parse Errors
// Description: Error taxonomy for malformed or missing run artifacts.
// Purpose: Give every ingestion failure a typed, reportable shape.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Parse errors cover every way a run artifact can fail to become a typed
//! value: missing files, malformed log lines, invalid identities, and bad
//! field paths. They are never fatal to an evaluation; the evaluator turns
//! them into validation alarms.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while parsing run artifacts into typed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A required artifact was absent.
    #[error("artifact missing: {0}")]
    Missing(String),
    /// An artifact existed but could not be read.
    #[error("artifact unreadable: {0}")]
    Unreadable(String),
    /// A log line could not be parsed.
    #[error("line {line}: {reason}")]
    Line {
        /// One-based line number within the log.
        line: usize,
        /// Failure description.
        reason: String,
    },
    /// JSON decoding failed.
    #[error("invalid json: {0}")]
    Json(String),
    /// An object did not carry a usable identity.
    #[error("invalid object identity: {0}")]
    Identity(String),
    /// A field path or pattern was malformed.
    #[error("invalid field path `{input}`: {reason}")]
    FieldPath {
        /// The rejected input.
        input: String,
        /// Failure description.
        reason: String,
    },
    /// An event operation label was not recognized.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    /// A history violated its ordering invariant.
    #[error("invalid history: {0}")]
    History(String),
    /// A snapshot violated its uniqueness invariant.
    #[error("invalid snapshot: {0}")]
    Snapshot(String),
}
