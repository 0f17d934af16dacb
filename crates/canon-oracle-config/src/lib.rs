// crates/canon-oracle-config/src/lib.rs
// ============================================================================
// Module: Canon Oracle Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for canon-oracle.toml semantics.
// Dependencies: canon-oracle-core, serde, toml
// ============================================================================

//! ## Overview
//! `canon-oracle-config` defines the configuration model for the oracle. It
//! provides strict, fail-closed validation and converts the validated model
//! into the core evaluator configuration and audit sink, so no component
//! consults process-wide state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
