// crates/canon-oracle-core/src/runtime/baseline.rs
// ============================================================================
// Module: Canon Oracle Baseline Persistence
// Description: Writes, verifies, and loads persisted baseline artifacts.
// Purpose: Keep canonical baselines deterministic on disk and tamper-evident.
// Dependencies: crate::{core, interfaces}, serde, serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! Every artifact is written as canonical JSON. A learn-twice run writes the
//! canonical digest, snapshot, and mask, then a [`BaselineManifest`] with the
//! SHA-256 of all three. Test runs verify the manifest before trusting the baseline.
//! A learn-once run stages its raw history and snapshot under
//! `learn-once/` in the oracle directory for the following learn-twice run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::ArtifactDigest;
use crate::core::BASELINE_MANIFEST_VERSION;
use crate::core::BaselineIntegrity;
use crate::core::BaselineManifest;
use crate::core::FileHashEntry;
use crate::core::History;
use crate::core::HistoryDigest;
use crate::core::Mask;
use crate::core::StateSnapshot;
use crate::interfaces::ArtifactError;
use crate::interfaces::ArtifactLocation;
use crate::interfaces::ArtifactStore;
use crate::runtime::canonicalize::CanonicalBaseline;

// ============================================================================
// SECTION: Artifact Names
// ============================================================================

/// Raw history of a run.
pub const HISTORY_ARTIFACT: &str = "history.json";
/// History digest (raw in the result directory, canonical in the oracle directory).
pub const EVENT_ARTIFACT: &str = "event.json";
/// State snapshot (raw in the result directory, canonical in the oracle directory).
pub const STATE_ARTIFACT: &str = "state.json";
/// Learned mask.
pub const MASK_ARTIFACT: &str = "mask.json";
/// Baseline integrity manifest.
pub const MANIFEST_ARTIFACT: &str = "manifest.json";
/// Raw history staged by the first baseline run.
pub const LEARN_ONCE_HISTORY_ARTIFACT: &str = "learn-once/history.json";
/// Raw snapshot staged by the first baseline run.
pub const LEARN_ONCE_STATE_ARTIFACT: &str = "learn-once/state.json";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Baseline persistence and integrity errors.
#[derive(Debug, Error)]
pub enum BaselineError {
    /// Artifact store failure.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// A value could not be encoded as canonical JSON.
    #[error("canonical json encoding failed: {0}")]
    Encode(String),
    /// A required baseline artifact is absent.
    #[error("baseline artifact missing: {0}")]
    Missing(String),
    /// A baseline artifact could not be decoded.
    #[error("baseline artifact {name} is malformed: {reason}")]
    Decode {
        /// Artifact name.
        name: String,
        /// Decoder message.
        reason: String,
    },
    /// The manifest does not match the stored artifacts.
    #[error("baseline integrity check failed: {}", .0.join("; "))]
    Integrity(Vec<String>),
}

// ============================================================================
// SECTION: Verification Types
// ============================================================================

/// Baseline verification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Every artifact matched its manifest entry.
    Pass,
    /// At least one check failed.
    Fail,
}

/// Result of verifying a baseline against its manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Verification status.
    pub status: VerificationStatus,
    /// Number of artifacts hashed.
    pub checked_files: usize,
    /// Failure descriptions.
    pub errors: Vec<String>,
}

/// Canonical baseline read back from the oracle directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBaseline {
    /// Canonical digest.
    pub digest: HistoryDigest,
    /// Canonical snapshot.
    pub snapshot: StateSnapshot,
    /// Learned mask.
    pub mask: Mask,
    /// Manifest the artifacts were verified against.
    pub manifest: BaselineManifest,
}

/// Raw artifacts staged by a learn-once run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedBaseline {
    /// Staged history, when history generation ran.
    pub history: Option<History>,
    /// Staged snapshot, when state generation ran.
    pub snapshot: Option<StateSnapshot>,
}

// ============================================================================
// SECTION: JSON Artifacts
// ============================================================================

/// Encodes a value as RFC 8785 canonical JSON.
///
/// # Errors
///
/// Returns [`BaselineError::Encode`] when the value cannot be serialized.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BaselineError> {
    serde_jcs::to_vec(value).map_err(|err| BaselineError::Encode(err.to_string()))
}

/// Writes a value as canonical JSON and returns the digest of the bytes.
///
/// # Errors
///
/// Returns [`BaselineError`] when serialization or the write fails.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn ArtifactStore,
    location: ArtifactLocation,
    name: &str,
    value: &T,
) -> Result<ArtifactDigest, BaselineError> {
    let bytes = canonical_json(value)?;
    store.write(location, name, &bytes)?;
    Ok(ArtifactDigest::of(&bytes))
}

/// Digests the canonical JSON of the manifest entry list.
fn root_digest(file_hashes: &[FileHashEntry]) -> Result<ArtifactDigest, BaselineError> {
    canonical_json(file_hashes).map(|bytes| ArtifactDigest::of(&bytes))
}

/// Reads and decodes a JSON artifact. Returns `Ok(None)` when absent.
///
/// # Errors
///
/// Returns [`BaselineError`] when the read fails or the bytes do not decode.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn ArtifactStore,
    location: ArtifactLocation,
    name: &str,
) -> Result<Option<T>, BaselineError> {
    let Some(bytes) = store.read(location, name)? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes).map(Some).map_err(|err| BaselineError::Decode {
        name: name.to_string(),
        reason: err.to_string(),
    })
}

/// Reads and decodes a JSON artifact that must exist.
fn require_json<T: DeserializeOwned>(
    store: &dyn ArtifactStore,
    location: ArtifactLocation,
    name: &str,
) -> Result<T, BaselineError> {
    read_json(store, location, name)?.ok_or_else(|| BaselineError::Missing(name.to_string()))
}

// ============================================================================
// SECTION: Learn-Once Staging
// ============================================================================

/// Stages the first baseline's raw artifacts in the oracle directory.
///
/// # Errors
///
/// Returns [`BaselineError`] when a write fails.
pub fn stage_learn_once(
    store: &dyn ArtifactStore,
    history: Option<&History>,
    snapshot: Option<&StateSnapshot>,
) -> Result<(), BaselineError> {
    if let Some(history) = history {
        write_json(store, ArtifactLocation::Oracle, LEARN_ONCE_HISTORY_ARTIFACT, history)?;
    }
    if let Some(snapshot) = snapshot {
        write_json(store, ArtifactLocation::Oracle, LEARN_ONCE_STATE_ARTIFACT, snapshot)?;
    }
    Ok(())
}

/// Removes any previously staged learn-once artifacts.
///
/// # Errors
///
/// Returns [`BaselineError`] when a staged artifact cannot be removed.
pub fn clear_learn_once(store: &dyn ArtifactStore) -> Result<(), BaselineError> {
    store.remove(ArtifactLocation::Oracle, LEARN_ONCE_HISTORY_ARTIFACT)?;
    store.remove(ArtifactLocation::Oracle, LEARN_ONCE_STATE_ARTIFACT)?;
    Ok(())
}

/// Loads whatever the learn-once run staged.
///
/// # Errors
///
/// Returns [`BaselineError`] when a staged artifact exists but cannot be read.
pub fn load_learn_once(store: &dyn ArtifactStore) -> Result<StagedBaseline, BaselineError> {
    Ok(StagedBaseline {
        history: read_json(store, ArtifactLocation::Oracle, LEARN_ONCE_HISTORY_ARTIFACT)?,
        snapshot: read_json(store, ArtifactLocation::Oracle, LEARN_ONCE_STATE_ARTIFACT)?,
    })
}

// ============================================================================
// SECTION: Canonical Baseline
// ============================================================================

/// Writes the canonical artifacts and their manifest.
///
/// # Errors
///
/// Returns [`BaselineError`] when serialization or a write fails.
pub fn write_canonical_baseline(
    store: &dyn ArtifactStore,
    baseline: &CanonicalBaseline,
) -> Result<BaselineManifest, BaselineError> {
    let mut file_hashes = Vec::with_capacity(3);
    let oracle = ArtifactLocation::Oracle;
    file_hashes.push(FileHashEntry {
        path: EVENT_ARTIFACT.to_string(),
        sha256: write_json(store, oracle, EVENT_ARTIFACT, &baseline.digest)?,
    });
    file_hashes.push(FileHashEntry {
        path: MASK_ARTIFACT.to_string(),
        sha256: write_json(store, oracle, MASK_ARTIFACT, &baseline.mask)?,
    });
    file_hashes.push(FileHashEntry {
        path: STATE_ARTIFACT.to_string(),
        sha256: write_json(store, oracle, STATE_ARTIFACT, &baseline.snapshot)?,
    });
    let root_sha256 = root_digest(&file_hashes)?;
    let manifest = BaselineManifest {
        manifest_version: BASELINE_MANIFEST_VERSION.to_string(),
        warning_count: baseline.warnings.len(),
        integrity: BaselineIntegrity {
            file_hashes,
            root_sha256,
        },
    };
    write_json(store, oracle, MANIFEST_ARTIFACT, &manifest)?;
    Ok(manifest)
}

/// Verifies the stored baseline artifacts against the manifest.
///
/// # Errors
///
/// Returns [`BaselineError`] when the manifest is missing or unreadable.
pub fn verify_baseline(
    store: &dyn ArtifactStore,
) -> Result<(BaselineManifest, VerificationReport), BaselineError> {
    let manifest: BaselineManifest =
        require_json(store, ArtifactLocation::Oracle, MANIFEST_ARTIFACT)?;
    let mut errors = Vec::new();
    let mut checked = 0usize;

    if manifest.manifest_version != BASELINE_MANIFEST_VERSION {
        errors.push(format!("unsupported manifest version {}", manifest.manifest_version));
    }
    for entry in &manifest.integrity.file_hashes {
        match store.read(ArtifactLocation::Oracle, &entry.path)? {
            Some(bytes) => {
                if ArtifactDigest::of(&bytes) != entry.sha256 {
                    errors.push(format!("hash mismatch for {}", entry.path));
                }
                checked = checked.saturating_add(1);
            }
            None => errors.push(format!("missing artifact {}", entry.path)),
        }
    }
    for required in [EVENT_ARTIFACT, MASK_ARTIFACT, STATE_ARTIFACT] {
        if !manifest.integrity.file_hashes.iter().any(|entry| entry.path == required) {
            errors.push(format!("manifest does not cover {required}"));
        }
    }
    match root_digest(&manifest.integrity.file_hashes) {
        Ok(root_sha256) if root_sha256 == manifest.integrity.root_sha256 => {}
        Ok(_) => errors.push("root hash mismatch".to_string()),
        Err(_) => errors.push("failed to compute root hash".to_string()),
    }

    let status = if errors.is_empty() { VerificationStatus::Pass } else { VerificationStatus::Fail };
    Ok((
        manifest,
        VerificationReport {
            status,
            checked_files: checked,
            errors,
        },
    ))
}

/// Verifies and loads the canonical baseline.
///
/// # Errors
///
/// Returns [`BaselineError`] when an artifact is missing, malformed, or fails
/// integrity verification.
pub fn load_canonical_baseline(store: &dyn ArtifactStore) -> Result<LoadedBaseline, BaselineError> {
    let (manifest, report) = verify_baseline(store)?;
    if report.status == VerificationStatus::Fail {
        return Err(BaselineError::Integrity(report.errors));
    }
    Ok(LoadedBaseline {
        digest: require_json(store, ArtifactLocation::Oracle, EVENT_ARTIFACT)?,
        snapshot: require_json(store, ArtifactLocation::Oracle, STATE_ARTIFACT)?,
        mask: require_json(store, ArtifactLocation::Oracle, MASK_ARTIFACT)?,
        manifest,
    })
}
