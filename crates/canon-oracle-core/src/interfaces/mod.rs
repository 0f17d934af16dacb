// crates/canon-oracle-core/src/interfaces/mod.rs
// ============================================================================
// Module: Canon Oracle Interfaces
// Description: Backend-agnostic interfaces for artifact storage, log scanning, and pre-checks.
// Purpose: Define the collaborator surfaces the evaluator depends on.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The evaluator never touches the filesystem or raw log producers directly.
//! It reads and writes artifacts through an [`ArtifactStore`], folds in log
//! findings through [`LogScanner`] implementations, and consults a
//! [`PrecheckValidator`] before comparing. Implementations must be
//! deterministic and must report absence rather than invent content.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::core::CheckResult;
use crate::core::RunMode;

// ============================================================================
// SECTION: Artifact Store
// ============================================================================

/// Directory an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactLocation {
    /// Per-run result directory.
    Result,
    /// Per-scenario oracle directory.
    Oracle,
}

impl ArtifactLocation {
    /// Returns the label used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Result => "result_dir",
            Self::Oracle => "oracle_dir",
        }
    }
}

impl fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifact store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    /// Underlying I/O failed.
    #[error("artifact io error: {0}")]
    Io(String),
    /// Artifact name escaped its directory or was otherwise invalid.
    #[error("invalid artifact path: {0}")]
    InvalidPath(String),
    /// Artifact exceeded the configured size limit.
    #[error("artifact {name} exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge {
        /// Artifact name.
        name: String,
        /// Observed size in bytes.
        actual: u64,
        /// Configured limit in bytes.
        limit: u64,
    },
    /// Store-internal failure.
    #[error("artifact store error: {0}")]
    Store(String),
}

/// Reads and writes named artifacts in the result and oracle directories.
pub trait ArtifactStore {
    /// Reads an artifact. Returns `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when the artifact exists but cannot be read.
    fn read(&self, location: ArtifactLocation, name: &str)
    -> Result<Option<Vec<u8>>, ArtifactError>;

    /// Writes an artifact, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when writing fails.
    fn write(
        &self,
        location: ArtifactLocation,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), ArtifactError>;

    /// Removes an artifact. Removing an absent artifact succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when the artifact exists but cannot be removed.
    fn remove(&self, location: ArtifactLocation, name: &str) -> Result<(), ArtifactError>;
}

// ============================================================================
// SECTION: Log Scanners
// ============================================================================

/// Line scanner over a collaborator log.
pub trait LogScanner: Send + Sync {
    /// Returns a stable scanner label.
    fn name(&self) -> &'static str;

    /// Scans log text and returns one alarm per finding.
    fn scan(&self, log: &str) -> CheckResult;
}

// ============================================================================
// SECTION: Pre-Check Validation
// ============================================================================

/// Validates fault-injection metadata before comparisons run.
pub trait PrecheckValidator: Send + Sync {
    /// Validates the metadata bytes, `None` when the file is absent.
    ///
    /// Returns a negative magnitude to short-circuit the evaluation.
    fn validate(&self, mode: RunMode, metadata: Option<&[u8]>) -> CheckResult;

    /// Summarises the metadata for a debugging hint.
    fn describe(&self, metadata: Option<&[u8]>) -> Option<String>;
}
