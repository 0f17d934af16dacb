// crates/canon-oracle-core/src/audit.rs
// ============================================================================
// Module: Canon Oracle Audit Logging
// Description: Structured audit events for oracle evaluations.
// Purpose: Emit JSON-lines records of each component outcome and final verdict.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The evaluator reports one `oracle_stage` event per planned component and
//! one `oracle_verdict` event per evaluation. Sinks decide where the JSON
//! lines go: stderr, an append-only file, or nowhere. Sink failures are
//! swallowed; auditing never changes a verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::Component;
use crate::core::RunMode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of one component within an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    /// Component ran to completion.
    Completed,
    /// Component was disabled by a toggle or preempted by an earlier failure.
    Skipped,
    /// Component hit a parse or validation failure.
    Failed,
}

/// Audit event for one component.
#[derive(Debug, Clone, Serialize)]
pub struct StageAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Run mode.
    pub mode: RunMode,
    /// Component reported.
    pub component: Component,
    /// Component outcome.
    pub outcome: StageOutcome,
    /// Magnitude the component contributed.
    pub magnitude: i64,
    /// Number of alarms the component produced.
    pub alarm_count: usize,
}

impl StageAuditEvent {
    /// Creates a stage event stamped with the current time.
    #[must_use]
    pub fn new(
        mode: RunMode,
        component: Component,
        outcome: StageOutcome,
        magnitude: i64,
        alarm_count: usize,
    ) -> Self {
        Self {
            event: "oracle_stage",
            timestamp_ms: now_ms(),
            mode,
            component,
            outcome,
            magnitude,
            alarm_count,
        }
    }
}

/// Audit event for a completed evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct VerdictAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Run mode.
    pub mode: RunMode,
    /// Final magnitude.
    pub magnitude: i64,
    /// Number of alarms reported.
    pub alarm_count: usize,
    /// Whether the validation override applied.
    pub validation_failed: bool,
}

impl VerdictAuditEvent {
    /// Creates a verdict event stamped with the current time.
    #[must_use]
    pub fn new(mode: RunMode, magnitude: i64, alarm_count: usize, validation_failed: bool) -> Self {
        Self {
            event: "oracle_verdict",
            timestamp_ms: now_ms(),
            mode,
            magnitude,
            alarm_count,
            validation_failed,
        }
    }
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for oracle events.
pub trait OracleAuditSink: Send + Sync {
    /// Records a stage event.
    fn record_stage(&self, event: &StageAuditEvent);

    /// Records a verdict event.
    fn record_verdict(&self, event: &VerdictAuditEvent);
}

/// Audit sink that writes JSON lines to stderr.
pub struct StderrAuditSink;

impl OracleAuditSink for StderrAuditSink {
    fn record_stage(&self, event: &StageAuditEvent) {
        write_stderr(event);
    }

    fn record_verdict(&self, event: &VerdictAuditEvent) {
        write_stderr(event);
    }
}

/// Writes one JSON line to stderr.
fn write_stderr<T: Serialize>(event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(io::stderr(), "{payload}");
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the audit log in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one JSON line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl OracleAuditSink for FileAuditSink {
    fn record_stage(&self, event: &StageAuditEvent) {
        self.append(event);
    }

    fn record_verdict(&self, event: &VerdictAuditEvent) {
        self.append(event);
    }
}

/// Audit sink that discards events.
pub struct NoopAuditSink;

impl OracleAuditSink for NoopAuditSink {
    fn record_stage(&self, _event: &StageAuditEvent) {}

    fn record_verdict(&self, _event: &VerdictAuditEvent) {}
}
