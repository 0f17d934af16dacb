// crates/canon-oracle-core/src/core/mod.rs
// ============================================================================
// Module: Canon Oracle Core Types
// Description: Data model for histories, snapshots, digests, masks, and alarms.
// Purpose: Provide stable, serializable types shared by every oracle component.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types are immutable values constructed once per run from raw
//! artifacts, plus the canonical baseline types persisted across runs. They
//! carry no I/O; runtime modules consume and produce them.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod alarm;
pub mod baseline;
pub mod context;
pub mod digest;
pub mod error;
pub mod event;
pub mod identifiers;
pub mod injection;
pub mod mask;
pub mod path;
pub mod snapshot;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use alarm::Alarm;
pub use alarm::AlarmCategory;
pub use alarm::CheckResult;
pub use alarm::VALIDATION_FAILURE;
pub use baseline::ArtifactDigest;
pub use baseline::BASELINE_MANIFEST_VERSION;
pub use baseline::BaselineIntegrity;
pub use baseline::BaselineManifest;
pub use baseline::FileHashEntry;
pub use context::CheckToggles;
pub use context::Component;
pub use context::ContextError;
pub use context::RunMode;
pub use context::TestContext;
pub use digest::EventSignature;
pub use digest::HistoryDigest;
pub use digest::ObjectDigest;
pub use digest::OrderClass;
pub use error::ParseError;
pub use event::Event;
pub use event::History;
pub use event::Operation;
pub use identifiers::ObjectKey;
pub use injection::InjectionAction;
pub use injection::InjectionRecord;
pub use mask::Mask;
pub use path::FieldPath;
pub use path::FieldPattern;
pub use path::PatternSegment;
pub use path::Segment;
pub use snapshot::StateSnapshot;
pub use value::Number;
pub use value::Scalar;
pub use value::Value;
