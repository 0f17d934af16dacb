// crates/canon-oracle-core/src/runtime/mod.rs
// ============================================================================
// Module: Canon Oracle Runtime
// Description: Ingestion, digesting, canonicalization, comparison, and evaluation.
// Purpose: Turn run artifacts into verdicts against a learned baseline.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules are pure transformations over core types, except for
//! [`baseline`] and [`store`], which persist and read artifacts through the
//! [`crate::interfaces::ArtifactStore`] interface. [`evaluator`] drives them
//! according to the run-mode component table.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod baseline;
pub mod canonicalize;
pub mod digest;
pub mod evaluator;
pub mod history_check;
pub mod ingest;
pub mod scanners;
pub mod state_check;
pub mod store;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use baseline::BaselineError;
pub use baseline::LoadedBaseline;
pub use baseline::StagedBaseline;
pub use baseline::VerificationReport;
pub use baseline::VerificationStatus;
pub use canonicalize::BaselineRun;
pub use canonicalize::CanonicalBaseline;
pub use canonicalize::Canonicalizer;
pub use digest::DigestBuilder;
pub use digest::DigestPolicy;
pub use digest::OrderPolicy;
pub use digest::build_digest;
pub use evaluator::EvaluationError;
pub use evaluator::Evaluator;
pub use evaluator::EvaluatorConfig;
pub use evaluator::InputFiles;
pub use evaluator::Verdict;
pub use history_check::compare_digests;
pub use history_check::compare_history;
pub use ingest::parse_event_log;
pub use ingest::parse_resource_listing;
pub use scanners::OperatorPanicScanner;
pub use scanners::WorkloadErrorScanner;
pub use state_check::compare_state;
pub use store::DEFAULT_MAX_ARTIFACT_BYTES;
pub use store::FsArtifactStore;
pub use store::InMemoryArtifactStore;
pub use validation::InjectionValidator;
