// crates/canon-oracle-core/src/core/identifiers.rs
// ============================================================================
// Module: Canon Oracle Identifiers
// Description: Object identity used to correlate events and state across runs.
// Purpose: Provide a strongly typed, totally ordered object key with a stable string form.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`ObjectKey`] names one tracked object by kind, namespace, and name. It
//! serializes as `kind/namespace/name` so it can key JSON objects in persisted
//! digests and snapshots. Cluster-scoped objects carry an empty namespace
//! (`Node//worker-1`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::core::error::ParseError;
use crate::core::value::Value;

// ============================================================================
// SECTION: Object Key
// ============================================================================

/// Identity of a tracked object.
///
/// # Invariants
/// - `kind` and `name` are non-empty and contain no `/`.
/// - `namespace` contains no `/` and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    /// Object type (for example `Pod`).
    kind: String,
    /// Object namespace, empty for cluster-scoped objects.
    namespace: String,
    /// Object name.
    name: String,
}

impl ObjectKey {
    /// Creates an object key after validating each component.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Identity`] when a component is empty or contains `/`.
    pub fn new(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let key = Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        };
        if key.kind.is_empty() || key.name.is_empty() {
            return Err(ParseError::Identity(format!("kind and name are required: {key}")));
        }
        if key.kind.contains('/') || key.namespace.contains('/') {
            return Err(ParseError::Identity(format!("kind and namespace must not contain '/': {key}")));
        }
        Ok(key)
    }

    /// Derives the key from an object's `kind` and `metadata` fields.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Identity`] when `kind` or `metadata.name` is
    /// missing or not a string.
    pub fn from_object(object: &Value) -> Result<Self, ParseError> {
        let kind = object
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::Identity("missing string field `kind`".to_string()))?;
        let metadata = object
            .get("metadata")
            .ok_or_else(|| ParseError::Identity(format!("{kind}: missing `metadata`")))?;
        let name = metadata
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::Identity(format!("{kind}: missing `metadata.name`")))?;
        let namespace = match metadata.get("namespace") {
            None => "",
            Some(value) => value.as_str().ok_or_else(|| {
                ParseError::Identity(format!("{kind}/{name}: `metadata.namespace` is not a string"))
            })?,
        };
        Self::new(kind, namespace, name)
    }

    /// Returns the object kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the object namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the object name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

impl FromStr for ObjectKey {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(kind), Some(namespace), Some(name)) => Self::new(kind, namespace, name),
            _ => Err(ParseError::Identity(format!("expected kind/namespace/name, got `{input}`"))),
        }
    }
}

impl Serialize for ObjectKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
