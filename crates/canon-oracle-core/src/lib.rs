// crates/canon-oracle-core/src/lib.rs
// ============================================================================
// Module: Canon Oracle Core Library
// Description: Public API surface for the differential correctness oracle.
// Purpose: Expose core types, collaborator interfaces, runtime stages, and audit sinks.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Canon oracle decides whether a completed run of a control plane under
//! test behaved acceptably. Two known-good executions of a scenario are
//! diffed to learn a canonical baseline and a mask of non-deterministic
//! fields; later runs are compared against that baseline with the mask
//! applied. Findings are reported as sorted alarms with a magnitude.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::OracleAuditSink;
pub use audit::StderrAuditSink;
pub use core::*;
pub use interfaces::ArtifactError;
pub use interfaces::ArtifactLocation;
pub use interfaces::ArtifactStore;
pub use interfaces::LogScanner;
pub use interfaces::PrecheckValidator;
pub use runtime::BaselineError;
pub use runtime::BaselineRun;
pub use runtime::CanonicalBaseline;
pub use runtime::Canonicalizer;
pub use runtime::DigestBuilder;
pub use runtime::DigestPolicy;
pub use runtime::EvaluationError;
pub use runtime::Evaluator;
pub use runtime::EvaluatorConfig;
pub use runtime::FsArtifactStore;
pub use runtime::InMemoryArtifactStore;
pub use runtime::InputFiles;
pub use runtime::OrderPolicy;
pub use runtime::Verdict;
