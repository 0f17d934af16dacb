// crates/canon-oracle-config/src/config.rs
// ============================================================================
// Module: Canon Oracle Configuration
// Description: Configuration loading and validation for the oracle.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: canon-oracle-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every check toggle must be spelled out: a missing toggle is a parse error
//! and aborts before any component runs. Other sections fall back to
//! defaults. Unknown keys are rejected everywhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use canon_oracle_core::CheckToggles;
use canon_oracle_core::DigestPolicy;
use canon_oracle_core::EvaluatorConfig;
use canon_oracle_core::FieldPattern;
use canon_oracle_core::FileAuditSink;
use canon_oracle_core::InputFiles;
use canon_oracle_core::Mask;
use canon_oracle_core::NoopAuditSink;
use canon_oracle_core::Operation;
use canon_oracle_core::OracleAuditSink;
use canon_oracle_core::OrderPolicy;
use canon_oracle_core::StderrAuditSink;
use canon_oracle_core::runtime::DEFAULT_MAX_ARTIFACT_BYTES;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "canon-oracle.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CANON_ORACLE_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Largest accepted per-artifact read limit.
pub const MAX_ARTIFACT_BYTES_LIMIT: u64 = 1024 * 1024 * 1024;
/// Maximum number of static ignored paths.
pub const MAX_IGNORED_PATHS: usize = 256;

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Oracle configuration loaded from `canon-oracle.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleConfig {
    /// Per-component check toggles. Required, with every toggle present.
    pub checks: CheckToggles,
    /// Digest policy configuration.
    #[serde(default)]
    pub digest: DigestConfig,
    /// Raw artifact names and limits.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl OracleConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.digest.validate()?;
        self.artifacts.validate()?;
        self.audit.validate()
    }

    /// Builds the core evaluator configuration. Check toggles are passed to
    /// the run context separately.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the digest section is invalid.
    pub fn evaluator_config(&self) -> Result<EvaluatorConfig, ConfigError> {
        Ok(EvaluatorConfig {
            digest_policy: self.digest.policy()?,
            inputs: self.artifacts.input_files(),
            max_artifact_bytes: self.artifacts.max_artifact_bytes,
        })
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the audit log cannot be opened.
    pub fn audit_sink(&self) -> Result<Box<dyn OracleAuditSink>, ConfigError> {
        self.audit.build()
    }
}

// ============================================================================
// SECTION: Digest Config
// ============================================================================

/// Digest policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DigestConfig {
    /// Operations whose relative order is not significant.
    #[serde(default = "default_order_insensitive_operations")]
    pub order_insensitive_operations: Vec<String>,
    /// Field patterns stripped from every digest and state comparison.
    #[serde(default = "default_ignored_paths")]
    pub ignored_paths: Vec<String>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            order_insensitive_operations: default_order_insensitive_operations(),
            ignored_paths: default_ignored_paths(),
        }
    }
}

impl DigestConfig {
    /// Validates operation names and field patterns.
    fn validate(&self) -> Result<(), ConfigError> {
        self.operations()?;
        self.ignored_mask()?;
        Ok(())
    }

    /// Builds the core digest policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an operation or pattern is invalid.
    pub fn policy(&self) -> Result<DigestPolicy, ConfigError> {
        Ok(DigestPolicy {
            order: OrderPolicy::new(self.operations()?),
            ignored: self.ignored_mask()?,
        })
    }

    /// Parses the order-insensitive operation names.
    fn operations(&self) -> Result<Vec<Operation>, ConfigError> {
        self.order_insensitive_operations
            .iter()
            .map(|name| {
                name.parse::<Operation>().map_err(|err| {
                    ConfigError::Invalid(format!("digest.order_insensitive_operations: {err}"))
                })
            })
            .collect()
    }

    /// Parses the ignored field patterns into a mask.
    fn ignored_mask(&self) -> Result<Mask, ConfigError> {
        if self.ignored_paths.len() > MAX_IGNORED_PATHS {
            return Err(ConfigError::Invalid(format!(
                "digest.ignored_paths exceeds {MAX_IGNORED_PATHS} entries"
            )));
        }
        self.ignored_paths
            .iter()
            .map(|pattern| {
                pattern
                    .parse::<FieldPattern>()
                    .map_err(|err| ConfigError::Invalid(format!("digest.ignored_paths: {err}")))
            })
            .collect()
    }
}

/// Default order-insensitive operations.
fn default_order_insensitive_operations() -> Vec<String> {
    vec![Operation::Sync.as_str().to_string()]
}

/// Default statically ignored paths.
fn default_ignored_paths() -> Vec<String> {
    vec!["metadata.managedFields".to_string()]
}

// ============================================================================
// SECTION: Artifacts Config
// ============================================================================

/// Raw artifact names inside the result directory and read limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactsConfig {
    /// Raw event log name.
    #[serde(default = "default_event_log")]
    pub event_log: String,
    /// Final resource listing name.
    #[serde(default = "default_resource_listing")]
    pub resource_listing: String,
    /// Operator log name.
    #[serde(default = "default_operator_log")]
    pub operator_log: String,
    /// Workload log name.
    #[serde(default = "default_workload_log")]
    pub workload_log: String,
    /// Fault-injection metadata name.
    #[serde(default = "default_injection_metadata")]
    pub injection_metadata: String,
    /// Largest artifact the evaluator will read, in bytes.
    #[serde(default = "default_max_artifact_bytes")]
    pub max_artifact_bytes: u64,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            event_log: default_event_log(),
            resource_listing: default_resource_listing(),
            operator_log: default_operator_log(),
            workload_log: default_workload_log(),
            injection_metadata: default_injection_metadata(),
            max_artifact_bytes: default_max_artifact_bytes(),
        }
    }
}

impl ArtifactsConfig {
    /// Validates artifact names and the read limit.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("artifacts.event_log", &self.event_log),
            ("artifacts.resource_listing", &self.resource_listing),
            ("artifacts.operator_log", &self.operator_log),
            ("artifacts.workload_log", &self.workload_log),
            ("artifacts.injection_metadata", &self.injection_metadata),
        ] {
            validate_artifact_name(field, value)?;
        }
        if self.max_artifact_bytes == 0 || self.max_artifact_bytes > MAX_ARTIFACT_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "artifacts.max_artifact_bytes must be between 1 and {MAX_ARTIFACT_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Returns the core input file names.
    #[must_use]
    pub fn input_files(&self) -> InputFiles {
        InputFiles {
            event_log: self.event_log.trim().to_string(),
            resource_listing: self.resource_listing.trim().to_string(),
            operator_log: self.operator_log.trim().to_string(),
            workload_log: self.workload_log.trim().to_string(),
            injection_metadata: self.injection_metadata.trim().to_string(),
        }
    }
}

/// Default raw event log name.
fn default_event_log() -> String {
    InputFiles::default().event_log
}

/// Default resource listing name.
fn default_resource_listing() -> String {
    InputFiles::default().resource_listing
}

/// Default operator log name.
fn default_operator_log() -> String {
    InputFiles::default().operator_log
}

/// Default workload log name.
fn default_workload_log() -> String {
    InputFiles::default().workload_log
}

/// Default injection metadata name.
fn default_injection_metadata() -> String {
    InputFiles::default().injection_metadata
}

/// Default artifact read limit.
const fn default_max_artifact_bytes() -> u64 {
    DEFAULT_MAX_ARTIFACT_BYTES
}

// ============================================================================
// SECTION: Audit Config
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit events.
    None,
}

/// Audit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path, required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates the sink/path combination.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Builds the audit sink.
    fn build(&self) -> Result<Box<dyn OracleAuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::Stderr, _) => Ok(Box::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Box::new(NoopAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(format!("{path}: {err}")))?;
                Ok(Box::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error, including missing required toggles.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an artifact name relative to the result directory.
fn validate_artifact_name(field: &str, value: &str) -> Result<(), ConfigError> {
    validate_path_string(field, value)?;
    for component in Path::new(value.trim()).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be relative to the result directory"
                )));
            }
        }
    }
    Ok(())
}
