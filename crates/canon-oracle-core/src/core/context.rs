// crates/canon-oracle-core/src/core/context.rs
// ============================================================================
// Module: Canon Oracle Run Context
// Description: Run modes, component plans, check toggles, and the per-run context.
// Purpose: Make the legal mode and component combinations explicit and enumerable.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Each invocation runs in one [`RunMode`]. A fixed table maps every mode to
//! the [`Component`] list it may execute, and [`CheckToggles`] gate the
//! individual components. [`RunMode::plan`] combines both into the ordered
//! component list an evaluation actually runs.
//!
//! | Mode | Components |
//! |---|---|
//! | `learn-once` | history generation, state generation |
//! | `learn-twice` | generation, canonicalization |
//! | `test` | generation, injection validation, scanners, history check, state check |
//! | `obs-gap` | as `test` without the history check |

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Components
// ============================================================================

/// One step of an oracle evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Parse the event log and persist the raw history and digest.
    HistoryGeneration,
    /// Parse the resource listing and persist the raw snapshot.
    StateGeneration,
    /// Derive and persist the canonical baseline.
    Canonicalization,
    /// Validate fault-injection metadata.
    InjectionValidation,
    /// Scan the operator log for panics.
    OperatorScan,
    /// Scan the workload log for errors.
    WorkloadScan,
    /// Compare the run's history against the canonical digest.
    HistoryCheck,
    /// Compare the run's final state against the canonical snapshot.
    StateCheck,
}

impl Component {
    /// Returns the stable label used in audit events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HistoryGeneration => "history_generation",
            Self::StateGeneration => "state_generation",
            Self::Canonicalization => "canonicalization",
            Self::InjectionValidation => "injection_validation",
            Self::OperatorScan => "operator_scan",
            Self::WorkloadScan => "workload_scan",
            Self::HistoryCheck => "history_check",
            Self::StateCheck => "state_check",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Check Toggles
// ============================================================================

/// Named switches that enable or disable individual components.
///
/// # Invariants
/// - Every toggle must be present when deserialized; there are no defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools, reason = "Each toggle is an independent named switch.")]
pub struct CheckToggles {
    /// Enables history generation.
    pub generic_event_generation_enabled: bool,
    /// Enables state generation.
    pub generic_state_generation_enabled: bool,
    /// Enables the history check.
    pub generic_event_checker_enabled: bool,
    /// Enables the state check.
    pub generic_state_checker_enabled: bool,
    /// Enables the operator panic scanner.
    pub operator_checker_enabled: bool,
    /// Enables the workload error scanner.
    pub test_workload_checker_enabled: bool,
    /// Enables the injection debugging hint on non-zero verdicts.
    pub injection_desc_generation_enabled: bool,
}

impl CheckToggles {
    /// Returns toggles with every switch enabled.
    #[must_use]
    pub const fn all_enabled() -> Self {
        Self {
            generic_event_generation_enabled: true,
            generic_state_generation_enabled: true,
            generic_event_checker_enabled: true,
            generic_state_checker_enabled: true,
            operator_checker_enabled: true,
            test_workload_checker_enabled: true,
            injection_desc_generation_enabled: true,
        }
    }

    /// Returns true when `component` is enabled.
    #[must_use]
    pub const fn gate(&self, component: Component) -> bool {
        match component {
            Component::HistoryGeneration => self.generic_event_generation_enabled,
            Component::StateGeneration => self.generic_state_generation_enabled,
            Component::Canonicalization | Component::InjectionValidation => true,
            Component::OperatorScan => self.operator_checker_enabled,
            Component::WorkloadScan => self.test_workload_checker_enabled,
            Component::HistoryCheck => self.generic_event_checker_enabled,
            Component::StateCheck => self.generic_state_checker_enabled,
        }
    }
}

// ============================================================================
// SECTION: Run Modes
// ============================================================================

/// Components available in `learn-once`.
const LEARN_ONCE_PLAN: &[Component] = &[Component::HistoryGeneration, Component::StateGeneration];

/// Components available in `learn-twice`.
const LEARN_TWICE_PLAN: &[Component] =
    &[Component::HistoryGeneration, Component::StateGeneration, Component::Canonicalization];

/// Components available in `test`.
const TEST_PLAN: &[Component] = &[
    Component::HistoryGeneration,
    Component::StateGeneration,
    Component::InjectionValidation,
    Component::OperatorScan,
    Component::WorkloadScan,
    Component::HistoryCheck,
    Component::StateCheck,
];

/// Components available in `obs-gap`.
const OBS_GAP_PLAN: &[Component] = &[
    Component::HistoryGeneration,
    Component::StateGeneration,
    Component::InjectionValidation,
    Component::OperatorScan,
    Component::WorkloadScan,
    Component::StateCheck,
];

/// Invocation mode selected by the orchestration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// First baseline run.
    LearnOnce,
    /// Second baseline run; derives the canonical baseline.
    LearnTwice,
    /// Ordinary test run.
    Test,
    /// Diagnostic run measuring the observability of an injection window.
    ObsGap,
}

impl RunMode {
    /// All modes in declaration order.
    pub const ALL: [Self; 4] = [Self::LearnOnce, Self::LearnTwice, Self::Test, Self::ObsGap];

    /// Returns the kebab-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LearnOnce => "learn-once",
            Self::LearnTwice => "learn-twice",
            Self::Test => "test",
            Self::ObsGap => "obs-gap",
        }
    }

    /// Returns every component the mode may run, in execution order.
    #[must_use]
    pub const fn components(self) -> &'static [Component] {
        match self {
            Self::LearnOnce => LEARN_ONCE_PLAN,
            Self::LearnTwice => LEARN_TWICE_PLAN,
            Self::Test => TEST_PLAN,
            Self::ObsGap => OBS_GAP_PLAN,
        }
    }

    /// Returns true for the two baseline modes.
    #[must_use]
    pub const fn is_learning(self) -> bool {
        matches!(self, Self::LearnOnce | Self::LearnTwice)
    }

    /// Returns the components that run under `toggles`, in execution order.
    #[must_use]
    pub fn plan(self, toggles: &CheckToggles) -> Vec<Component> {
        self.components().iter().copied().filter(|component| toggles.gate(*component)).collect()
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = ContextError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| ContextError::UnknownMode(input.to_string()))
    }
}

// ============================================================================
// SECTION: Test Context
// ============================================================================

/// Errors raised when building a run context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// Run mode label was not recognized.
    #[error("unknown run mode `{0}`")]
    UnknownMode(String),
    /// A required directory was empty.
    #[error("{0} must not be empty")]
    EmptyPath(&'static str),
    /// Result and oracle directories were the same path.
    #[error("result_dir and oracle_dir must differ")]
    SharedDirectory,
}

/// Identity and configuration of one oracle evaluation.
///
/// # Invariants
/// - Immutable for the lifetime of the evaluation.
#[derive(Debug, Clone)]
pub struct TestContext<'a> {
    /// Selected run mode.
    mode: RunMode,
    /// Directory holding this run's raw artifacts.
    result_dir: PathBuf,
    /// Directory holding the scenario's baseline artifacts.
    oracle_dir: PathBuf,
    /// Active check toggles.
    toggles: &'a CheckToggles,
}

impl<'a> TestContext<'a> {
    /// Creates a context after validating the directories.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] when a directory is empty or both are equal.
    pub fn new(
        mode: RunMode,
        result_dir: impl Into<PathBuf>,
        oracle_dir: impl Into<PathBuf>,
        toggles: &'a CheckToggles,
    ) -> Result<Self, ContextError> {
        let result_dir = result_dir.into();
        let oracle_dir = oracle_dir.into();
        if result_dir.as_os_str().is_empty() {
            return Err(ContextError::EmptyPath("result_dir"));
        }
        if oracle_dir.as_os_str().is_empty() {
            return Err(ContextError::EmptyPath("oracle_dir"));
        }
        if result_dir == oracle_dir {
            return Err(ContextError::SharedDirectory);
        }
        Ok(Self {
            mode,
            result_dir,
            oracle_dir,
            toggles,
        })
    }

    /// Returns the run mode.
    #[must_use]
    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    /// Returns the result directory.
    #[must_use]
    pub fn result_dir(&self) -> &Path {
        &self.result_dir
    }

    /// Returns the oracle directory.
    #[must_use]
    pub fn oracle_dir(&self) -> &Path {
        &self.oracle_dir
    }

    /// Returns the active toggles.
    #[must_use]
    pub const fn toggles(&self) -> &'a CheckToggles {
        self.toggles
    }

    /// Returns the components this evaluation runs.
    #[must_use]
    pub fn plan(&self) -> Vec<Component> {
        self.mode.plan(self.toggles)
    }
}
