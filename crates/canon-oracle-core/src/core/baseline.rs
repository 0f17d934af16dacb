// crates/canon-oracle-core/src/core/baseline.rs
// ============================================================================
// Module: Canon Oracle Baseline Manifest
// Description: Integrity metadata for persisted canonical baselines.
// Purpose: Let test runs detect a tampered or partially written baseline.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! A learn-twice run records a [`BaselineManifest`] next to the canonical
//! artifacts it writes. The manifest lists the SHA-256 of each artifact and a
//! root digest over that list. Artifacts are always SHA-256; a different
//! digest would be a new manifest version.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest as _;
use sha2::Sha256;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Current baseline manifest format version.
pub const BASELINE_MANIFEST_VERSION: &str = "v2";

// ============================================================================
// SECTION: Artifact Digest
// ============================================================================

/// Lowercase hex SHA-256 of an artifact's bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactDigest(String);

impl ArtifactDigest {
    /// Digests raw bytes.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    /// Returns the hex text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Integrity manifest for one scenario baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineManifest {
    /// Manifest format version.
    pub manifest_version: String,
    /// Number of canonicalization warnings raised while learning.
    pub warning_count: usize,
    /// Artifact digests and root digest.
    pub integrity: BaselineIntegrity,
}

/// Artifact digests for a baseline.
///
/// # Invariants
/// - `root_sha256` is the digest of the canonical JSON of `file_hashes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineIntegrity {
    /// Per-artifact digests.
    pub file_hashes: Vec<FileHashEntry>,
    /// Digest over the ordered entry list.
    pub root_sha256: ArtifactDigest,
}

/// Digest of one baseline artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHashEntry {
    /// Artifact name relative to the oracle directory.
    pub path: String,
    /// Digest of the stored bytes.
    pub sha256: ArtifactDigest,
}
