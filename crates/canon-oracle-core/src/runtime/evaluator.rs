// crates/canon-oracle-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Canon Oracle Evaluator
// Description: Runs the components planned for a run mode and folds their results.
// Purpose: Produce one verdict per run from generation, learning, and checking stages.
// Dependencies: crate::{audit, core, interfaces, runtime}, serde
// ============================================================================

//! ## Overview
//! The evaluator walks the component table of the context's run mode in
//! order. Disabled components are skipped. Each enabled component returns a
//! [`CheckResult`]; the verdict magnitude is the sum of those magnitudes
//! unless any component returned a negative magnitude, which then overrides
//! the sum. Once a negative result is recorded, every later non-generation
//! component is skipped.
//!
//! Parse failures and unusable baselines become negative results with
//! alarms. Only failures to write artifacts abort the evaluation with an
//! [`EvaluationError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::audit::NoopAuditSink;
use crate::audit::OracleAuditSink;
use crate::audit::StageAuditEvent;
use crate::audit::StageOutcome;
use crate::audit::VerdictAuditEvent;
use crate::core::Alarm;
use crate::core::AlarmCategory;
use crate::core::CheckResult;
use crate::core::Component;
use crate::core::History;
use crate::core::ParseError;
use crate::core::RunMode;
use crate::core::StateSnapshot;
use crate::core::TestContext;
use crate::interfaces::ArtifactError;
use crate::interfaces::ArtifactLocation;
use crate::interfaces::ArtifactStore;
use crate::interfaces::LogScanner;
use crate::interfaces::PrecheckValidator;
use crate::runtime::baseline::BaselineError;
use crate::runtime::baseline::EVENT_ARTIFACT;
use crate::runtime::baseline::HISTORY_ARTIFACT;
use crate::runtime::baseline::LoadedBaseline;
use crate::runtime::baseline::STATE_ARTIFACT;
use crate::runtime::baseline::clear_learn_once;
use crate::runtime::baseline::load_canonical_baseline;
use crate::runtime::baseline::load_learn_once;
use crate::runtime::baseline::stage_learn_once;
use crate::runtime::baseline::write_canonical_baseline;
use crate::runtime::baseline::write_json;
use crate::runtime::canonicalize::BaselineRun;
use crate::runtime::canonicalize::Canonicalizer;
use crate::runtime::digest::DigestBuilder;
use crate::runtime::digest::DigestPolicy;
use crate::runtime::history_check::compare_history;
use crate::runtime::ingest::parse_event_log;
use crate::runtime::ingest::parse_resource_listing;
use crate::runtime::scanners::OperatorPanicScanner;
use crate::runtime::scanners::WorkloadErrorScanner;
use crate::runtime::state_check::compare_state;
use crate::runtime::store::DEFAULT_MAX_ARTIFACT_BYTES;
use crate::runtime::validation::InjectionValidator;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Names of the raw input artifacts inside the result directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFiles {
    /// Raw event log.
    pub event_log: String,
    /// Final resource listing.
    pub resource_listing: String,
    /// Operator log scanned for panics.
    pub operator_log: String,
    /// Workload log scanned for errors.
    pub workload_log: String,
    /// Fault-injection metadata.
    pub injection_metadata: String,
}

impl Default for InputFiles {
    fn default() -> Self {
        Self {
            event_log: "api-event.log".to_string(),
            resource_listing: "resources.json".to_string(),
            operator_log: "streamed-operator.log".to_string(),
            workload_log: "workload.log".to_string(),
            injection_metadata: "injection.json".to_string(),
        }
    }
}

/// Explicit evaluator configuration.
///
/// Component gating is not part of this value; it comes from the toggles
/// carried by each [`TestContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Digesting policy.
    pub digest_policy: DigestPolicy,
    /// Raw input names.
    pub inputs: InputFiles,
    /// Maximum bytes read from one artifact.
    pub max_artifact_bytes: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            digest_policy: DigestPolicy::default(),
            inputs: InputFiles::default(),
            max_artifact_bytes: DEFAULT_MAX_ARTIFACT_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Final outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Run mode evaluated.
    pub mode: RunMode,
    /// Final magnitude and sorted alarms.
    pub result: CheckResult,
    /// True when a negative result overrode the sum.
    pub validation_failed: bool,
    /// Number of canonicalization warnings among the alarms.
    pub warnings: usize,
    /// Debugging hint describing the injection, when enabled and non-zero.
    pub hint: Option<String>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal evaluation errors.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Persisting an artifact failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// Persisting a baseline artifact failed.
    #[error(transparent)]
    Baseline(#[from] BaselineError),
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Runs oracle components for a context.
pub struct Evaluator {
    /// Evaluator configuration.
    config: EvaluatorConfig,
    /// Digest builder derived from the policy.
    builder: DigestBuilder,
    /// Audit sink.
    audit: Box<dyn OracleAuditSink>,
    /// Pre-check validator.
    validator: Box<dyn PrecheckValidator>,
    /// Operator log scanner.
    operator_scanner: Box<dyn LogScanner>,
    /// Workload log scanner.
    workload_scanner: Box<dyn LogScanner>,
}

impl Evaluator {
    /// Creates an evaluator with the default collaborators and no auditing.
    #[must_use]
    pub fn new(config: EvaluatorConfig) -> Self {
        let builder = DigestBuilder::new(config.digest_policy.clone());
        Self {
            config,
            builder,
            audit: Box::new(NoopAuditSink),
            validator: Box::new(InjectionValidator),
            operator_scanner: Box::new(OperatorPanicScanner),
            workload_scanner: Box::new(WorkloadErrorScanner),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Box<dyn OracleAuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// Replaces the pre-check validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Box<dyn PrecheckValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Replaces both log scanners.
    #[must_use]
    pub fn with_scanners(
        mut self,
        operator: Box<dyn LogScanner>,
        workload: Box<dyn LogScanner>,
    ) -> Self {
        self.operator_scanner = operator;
        self.workload_scanner = workload;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluates one run.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] when an artifact cannot be persisted or a
    /// stale learn-once artifact cannot be cleared.
    pub fn evaluate(
        &self,
        context: &TestContext<'_>,
        store: &dyn ArtifactStore,
    ) -> Result<Verdict, EvaluationError> {
        let mode = context.mode();
        let mut run = Run {
            evaluator: self,
            mode,
            store,
            history: None,
            snapshot: None,
            baseline: None,
        };
        let mut tally = Tally::default();
        if mode == RunMode::LearnOnce {
            clear_learn_once(store)?;
        }

        for &component in mode.components() {
            let enabled = context.toggles().gate(component);
            let preempted = tally.failed() && !is_generation(component);
            if !enabled || preempted {
                self.audit.record_stage(&StageAuditEvent::new(
                    mode,
                    component,
                    StageOutcome::Skipped,
                    0,
                    0,
                ));
                continue;
            }
            let result = run.execute(component)?;
            let outcome = if result.is_validation_failure() {
                StageOutcome::Failed
            } else {
                StageOutcome::Completed
            };
            self.audit.record_stage(&StageAuditEvent::new(
                mode,
                component,
                outcome,
                result.violation_count,
                result.messages.len(),
            ));
            tally.add(result);
        }

        let validation_failed = tally.failed();
        let warnings = tally.warnings();
        let result = tally.finish();
        let hint = if context.toggles().injection_desc_generation_enabled && !result.is_clean() {
            run.describe_injection()
        } else {
            None
        };
        self.audit.record_verdict(&VerdictAuditEvent::new(
            mode,
            result.violation_count,
            result.messages.len(),
            validation_failed,
        ));
        Ok(Verdict {
            mode,
            result,
            validation_failed,
            warnings,
            hint,
        })
    }
}

/// Returns true for components that only materialize run artifacts.
const fn is_generation(component: Component) -> bool {
    matches!(component, Component::HistoryGeneration | Component::StateGeneration)
}

// ============================================================================
// SECTION: Tally
// ============================================================================

/// Accumulates component results.
#[derive(Debug, Default)]
struct Tally {
    /// Sum of non-negative magnitudes.
    sum: i64,
    /// Lowest negative magnitude seen.
    negative: Option<i64>,
    /// Every alarm reported.
    messages: Vec<Alarm>,
}

impl Tally {
    /// Folds in one component result.
    fn add(&mut self, result: CheckResult) {
        if result.violation_count < 0 {
            let lowest = self.negative.map_or(result.violation_count, |current| {
                current.min(result.violation_count)
            });
            self.negative = Some(lowest);
        } else {
            self.sum = self.sum.saturating_add(result.violation_count);
        }
        self.messages.extend(result.messages);
    }

    /// Returns true once a negative result was recorded.
    const fn failed(&self) -> bool {
        self.negative.is_some()
    }

    /// Returns the number of canonicalization warnings recorded.
    fn warnings(&self) -> usize {
        self.messages
            .iter()
            .filter(|alarm| alarm.category == AlarmCategory::CanonicalizationWarning)
            .count()
    }

    /// Produces the final result.
    fn finish(mut self) -> CheckResult {
        self.messages.sort();
        CheckResult {
            violation_count: self.negative.unwrap_or(self.sum),
            messages: self.messages,
        }
    }
}

// ============================================================================
// SECTION: Run State
// ============================================================================

/// Per-evaluation working state.
struct Run<'a> {
    /// Owning evaluator.
    evaluator: &'a Evaluator,
    /// Run mode.
    mode: RunMode,
    /// Artifact store.
    store: &'a dyn ArtifactStore,
    /// History parsed for this run.
    history: Option<History>,
    /// Snapshot parsed for this run.
    snapshot: Option<StateSnapshot>,
    /// Canonical baseline, loaded on first use.
    baseline: Option<LoadedBaseline>,
}

impl Run<'_> {
    /// Executes one enabled component.
    fn execute(&mut self, component: Component) -> Result<CheckResult, EvaluationError> {
        match component {
            Component::HistoryGeneration => self.generate_history(),
            Component::StateGeneration => self.generate_state(),
            Component::Canonicalization => self.canonicalize(),
            Component::InjectionValidation => Ok(self.validate_injection()),
            Component::OperatorScan => {
                let name = &self.evaluator.config.inputs.operator_log;
                Ok(self.scan(name, self.evaluator.operator_scanner.as_ref()))
            }
            Component::WorkloadScan => {
                let name = &self.evaluator.config.inputs.workload_log;
                Ok(self.scan(name, self.evaluator.workload_scanner.as_ref()))
            }
            Component::HistoryCheck => Ok(self.check_history()),
            Component::StateCheck => Ok(self.check_state()),
        }
    }

    /// Parses the event log and persists the raw history and digest.
    fn generate_history(&mut self) -> Result<CheckResult, EvaluationError> {
        let history = match self.ingest_history() {
            Ok(history) => history,
            Err(err) => return Ok(parse_failure(&self.evaluator.config.inputs.event_log, &err)),
        };
        let raw = self.evaluator.builder.build_raw(&history);
        write_json(self.store, ArtifactLocation::Result, HISTORY_ARTIFACT, &history)?;
        write_json(self.store, ArtifactLocation::Result, EVENT_ARTIFACT, &raw)?;
        if self.mode == RunMode::LearnOnce {
            stage_learn_once(self.store, Some(&history), None)?;
        }
        self.history = Some(history);
        Ok(CheckResult::pass())
    }

    /// Parses the resource listing and persists the raw snapshot.
    fn generate_state(&mut self) -> Result<CheckResult, EvaluationError> {
        let snapshot = match self.ingest_snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                return Ok(parse_failure(&self.evaluator.config.inputs.resource_listing, &err));
            }
        };
        write_json(self.store, ArtifactLocation::Result, STATE_ARTIFACT, &snapshot)?;
        if self.mode == RunMode::LearnOnce {
            stage_learn_once(self.store, None, Some(&snapshot))?;
        }
        self.snapshot = Some(snapshot);
        Ok(CheckResult::pass())
    }

    /// Derives and persists the canonical baseline from the staged and current runs.
    fn canonicalize(&mut self) -> Result<CheckResult, EvaluationError> {
        let staged = match load_learn_once(self.store) {
            Ok(staged) => staged,
            Err(err) => return Ok(validation_failure(format!("learn-once baseline unusable: {err}"))),
        };
        let first_history = match pair(staged.history, self.history.as_ref(), "history") {
            Ok(history) => history,
            Err(message) => return Ok(validation_failure(message)),
        };
        let first_snapshot = match pair(staged.snapshot, self.snapshot.as_ref(), "state") {
            Ok(snapshot) => snapshot,
            Err(message) => return Ok(validation_failure(message)),
        };
        let first = BaselineRun {
            history: first_history,
            snapshot: first_snapshot,
        };
        let second = BaselineRun {
            history: self.history.clone().unwrap_or_default(),
            snapshot: self.snapshot.clone().unwrap_or_default(),
        };
        let canonical =
            Canonicalizer::new(self.evaluator.builder.clone()).canonicalize(&first, &second);
        write_canonical_baseline(self.store, &canonical)?;
        Ok(canonical.warning_result())
    }

    /// Runs the pre-check validator.
    fn validate_injection(&self) -> CheckResult {
        match self.read_input(&self.evaluator.config.inputs.injection_metadata) {
            Ok(bytes) => self.evaluator.validator.validate(self.mode, bytes.as_deref()),
            Err(err) => validation_failure(format!("injection metadata unreadable: {err}")),
        }
    }

    /// Runs a log scanner over a result artifact.
    fn scan(&self, name: &str, scanner: &dyn LogScanner) -> CheckResult {
        match self.read_required(name) {
            Ok(bytes) => scanner.scan(&String::from_utf8_lossy(&bytes)),
            Err(err) => parse_failure(name, &err),
        }
    }

    /// Compares this run's history against the canonical digest.
    fn check_history(&mut self) -> CheckResult {
        if let Err(result) = self.load_baseline() {
            return result;
        }
        if self.history.is_none() {
            match self.ingest_history() {
                Ok(history) => self.history = Some(history),
                Err(err) => return parse_failure(&self.evaluator.config.inputs.event_log, &err),
            }
        }
        match (&self.history, &self.baseline) {
            (Some(history), Some(baseline)) => {
                compare_history(&self.evaluator.builder, history, &baseline.digest, &baseline.mask)
            }
            _ => CheckResult::pass(),
        }
    }

    /// Compares this run's final state against the canonical snapshot.
    fn check_state(&mut self) -> CheckResult {
        if let Err(result) = self.load_baseline() {
            return result;
        }
        if self.snapshot.is_none() {
            match self.ingest_snapshot() {
                Ok(snapshot) => self.snapshot = Some(snapshot),
                Err(err) => {
                    return parse_failure(&self.evaluator.config.inputs.resource_listing, &err);
                }
            }
        }
        match (&self.snapshot, &self.baseline) {
            (Some(snapshot), Some(baseline)) => {
                let mask = self.evaluator.builder.policy().effective_mask(&baseline.mask);
                compare_state(snapshot, &baseline.snapshot, &mask)
            }
            _ => CheckResult::pass(),
        }
    }

    /// Loads and verifies the canonical baseline once.
    fn load_baseline(&mut self) -> Result<(), CheckResult> {
        if self.baseline.is_some() {
            return Ok(());
        }
        match load_canonical_baseline(self.store) {
            Ok(baseline) => {
                self.baseline = Some(baseline);
                Ok(())
            }
            Err(err) => Err(validation_failure(format!("canonical baseline unusable: {err}"))),
        }
    }

    /// Summarises the injection metadata through the validator.
    fn describe_injection(&self) -> Option<String> {
        let bytes = self.read_input(&self.evaluator.config.inputs.injection_metadata).ok()?;
        self.evaluator.validator.describe(bytes.as_deref())
    }

    /// Parses the event log.
    fn ingest_history(&self) -> Result<History, ParseError> {
        let bytes = self.read_required(&self.evaluator.config.inputs.event_log)?;
        parse_event_log(&String::from_utf8_lossy(&bytes))
    }

    /// Parses the resource listing.
    fn ingest_snapshot(&self) -> Result<StateSnapshot, ParseError> {
        let bytes = self.read_required(&self.evaluator.config.inputs.resource_listing)?;
        parse_resource_listing(&bytes)
    }

    /// Reads an optional result artifact.
    fn read_input(&self, name: &str) -> Result<Option<Vec<u8>>, ParseError> {
        self.store
            .read(ArtifactLocation::Result, name)
            .map_err(|err| ParseError::Unreadable(format!("{name}: {err}")))
    }

    /// Reads a result artifact that must exist.
    fn read_required(&self, name: &str) -> Result<Vec<u8>, ParseError> {
        self.read_input(name)?.ok_or_else(|| ParseError::Missing(name.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Pairs a staged learn-once artifact with the current run's presence.
fn pair<T: Default>(staged: Option<T>, current: Option<&T>, label: &str) -> Result<T, String> {
    match (staged, current) {
        (Some(staged), Some(_)) => Ok(staged),
        (None, None) => Ok(T::default()),
        (None, Some(_)) => Err(format!("learn-once {label} was not staged")),
        (Some(_), None) => Err(format!("learn-twice run did not generate {label}")),
    }
}

/// Converts a parse error into a negative result.
fn parse_failure(artifact: &str, err: &ParseError) -> CheckResult {
    CheckResult::validation_failure(vec![Alarm::new(
        AlarmCategory::ParseError,
        format!("{artifact}: {err}"),
    )])
}

/// Builds a negative result with one validation alarm.
fn validation_failure(message: String) -> CheckResult {
    CheckResult::validation_failure(vec![Alarm::new(AlarmCategory::Validation, message)])
}
