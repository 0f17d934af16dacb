// crates/canon-oracle-core/src/runtime/store.rs
// ============================================================================
// Module: Canon Oracle Artifact Stores
// Description: Filesystem and in-memory implementations of the artifact store.
// Purpose: Read and write run and baseline artifacts with bounded, validated paths.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`FsArtifactStore`] maps the result and oracle locations onto two
//! directories. Artifact names are untrusted: absolute names, parent
//! traversal, and over-long paths are rejected, and reads are bounded by a
//! byte limit. Writes go to a sibling temporary file and are renamed into
//! place. [`InMemoryArtifactStore`] is a deterministic store for tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::TestContext;
use crate::interfaces::ArtifactError;
use crate::interfaces::ArtifactLocation;
use crate::interfaces::ArtifactStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum artifact size in bytes.
pub const DEFAULT_MAX_ARTIFACT_BYTES: u64 = 64 * 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Suffix for in-progress writes.
const TEMP_SUFFIX: &str = ".partial";

// ============================================================================
// SECTION: Filesystem Store
// ============================================================================

/// Filesystem-backed artifact store.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    /// Per-run result directory.
    result_dir: PathBuf,
    /// Per-scenario oracle directory.
    oracle_dir: PathBuf,
    /// Maximum bytes read from one artifact.
    max_bytes: u64,
}

impl FsArtifactStore {
    /// Creates a store over the two directories.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::InvalidPath`] when a directory path exceeds limits.
    pub fn new(
        result_dir: impl Into<PathBuf>,
        oracle_dir: impl Into<PathBuf>,
        max_bytes: u64,
    ) -> Result<Self, ArtifactError> {
        let result_dir = result_dir.into();
        let oracle_dir = oracle_dir.into();
        validate_path(&result_dir)?;
        validate_path(&oracle_dir)?;
        Ok(Self {
            result_dir,
            oracle_dir,
            max_bytes,
        })
    }

    /// Creates a store over the directories named by a run context.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::InvalidPath`] when a directory path exceeds limits.
    pub fn for_context(context: &TestContext<'_>, max_bytes: u64) -> Result<Self, ArtifactError> {
        Self::new(context.result_dir(), context.oracle_dir(), max_bytes)
    }

    /// Returns the directory backing `location`.
    fn root(&self, location: ArtifactLocation) -> &Path {
        match location {
            ArtifactLocation::Result => &self.result_dir,
            ArtifactLocation::Oracle => &self.oracle_dir,
        }
    }

    /// Resolves an artifact name under its location root.
    fn resolve(&self, location: ArtifactLocation, name: &str) -> Result<PathBuf, ArtifactError> {
        let candidate = Path::new(name);
        ensure_relative_path(candidate)?;
        let joined = self.root(location).join(candidate);
        validate_path(&joined)?;
        Ok(joined)
    }
}

impl ArtifactStore for FsArtifactStore {
    fn read(
        &self,
        location: ArtifactLocation,
        name: &str,
    ) -> Result<Option<Vec<u8>>, ArtifactError> {
        let path = self.resolve(location, name)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ArtifactError::Io(format!("{}: {err}", path.display()))),
        };
        let mut bytes = Vec::new();
        file.take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|err| ArtifactError::Io(format!("{}: {err}", path.display())))?;
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if actual > self.max_bytes {
            return Err(ArtifactError::TooLarge {
                name: format!("{location}/{name}"),
                actual,
                limit: self.max_bytes,
            });
        }
        Ok(Some(bytes))
    }

    fn write(
        &self,
        location: ArtifactLocation,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), ArtifactError> {
        let path = self.resolve(location, name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| ArtifactError::Io(format!("{}: {err}", parent.display())))?;
        }
        let mut temp = path.clone().into_os_string();
        temp.push(TEMP_SUFFIX);
        let temp = PathBuf::from(temp);
        fs::write(&temp, bytes)
            .map_err(|err| ArtifactError::Io(format!("{}: {err}", temp.display())))?;
        fs::rename(&temp, &path)
            .map_err(|err| ArtifactError::Io(format!("{}: {err}", path.display())))
    }

    fn remove(&self, location: ArtifactLocation, name: &str) -> Result<(), ArtifactError> {
        let path = self.resolve(location, name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ArtifactError::Io(format!("{}: {err}", path.display()))),
        }
    }
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Artifact map keyed by location and name.
type ArtifactMap = BTreeMap<(ArtifactLocation, String), Vec<u8>>;

/// In-memory artifact store for tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryArtifactStore {
    /// Artifacts protected by a mutex.
    artifacts: Arc<Mutex<ArtifactMap>>,
}

impl InMemoryArtifactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the names stored under `location`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Store`] when the mutex is poisoned.
    pub fn names(&self, location: ArtifactLocation) -> Result<Vec<String>, ArtifactError> {
        let guard = self.lock()?;
        Ok(guard
            .keys()
            .filter(|(stored, _)| *stored == location)
            .map(|(_, name)| name.clone())
            .collect())
    }

    /// Locks the artifact map.
    fn lock(&self) -> Result<MutexGuard<'_, ArtifactMap>, ArtifactError> {
        self.artifacts
            .lock()
            .map_err(|_| ArtifactError::Store("artifact store mutex poisoned".to_string()))
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn read(
        &self,
        location: ArtifactLocation,
        name: &str,
    ) -> Result<Option<Vec<u8>>, ArtifactError> {
        let guard = self.lock()?;
        Ok(guard.get(&(location, name.to_string())).cloned())
    }

    fn write(
        &self,
        location: ArtifactLocation,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), ArtifactError> {
        ensure_relative_path(Path::new(name))?;
        let mut guard = self.lock()?;
        guard.insert((location, name.to_string()), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, location: ArtifactLocation, name: &str) -> Result<(), ArtifactError> {
        let mut guard = self.lock()?;
        guard.remove(&(location, name.to_string()));
        Ok(())
    }
}

// ============================================================================
// SECTION: Path Helpers
// ============================================================================

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ArtifactError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ArtifactError::InvalidPath("path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ArtifactError::InvalidPath("path component too long".to_string()));
        }
    }
    Ok(())
}

/// Rejects absolute names and parent traversal.
fn ensure_relative_path(candidate: &Path) -> Result<(), ArtifactError> {
    if candidate.as_os_str().is_empty() {
        return Err(ArtifactError::InvalidPath("empty artifact name".to_string()));
    }
    for component in candidate.components() {
        match component {
            Component::ParentDir => {
                return Err(ArtifactError::InvalidPath(format!(
                    "{}: escapes its directory",
                    candidate.display()
                )));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(ArtifactError::InvalidPath(format!(
                    "{}: absolute names are not allowed",
                    candidate.display()
                )));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(())
}
