// crates/canon-oracle-core/src/core/value.rs
// ============================================================================
// Module: Canon Oracle Value Model
// Description: Closed tagged value type for observed resource content.
// Purpose: Give recursive comparison and masking a total, known shape.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Observed resource content is arbitrarily nested. Rather than walking an
//! open dynamic JSON value, the oracle converts it into [`Value`], a closed
//! variant of scalar, ordered sequence, or keyed mapping. Every variant is
//! totally ordered so values can be counted in multisets and sorted
//! deterministically. Numbers compare by integer value when both sides are
//! integers and by IEEE total order otherwise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::path::FieldPath;

// ============================================================================
// SECTION: Numbers
// ============================================================================

/// JSON number with a total order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Number(serde_json::Number);

impl Number {
    /// Wraps a JSON number.
    #[must_use]
    pub const fn new(number: serde_json::Number) -> Self {
        Self(number)
    }

    /// Returns the underlying JSON number.
    #[must_use]
    pub const fn as_json(&self) -> &serde_json::Number {
        &self.0
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self(serde_json::Number::from(value))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (integer_value(&self.0), integer_value(&other.0)) {
            (Some(left), Some(right)) => integer_cmp(left, right),
            _ => float_value(&self.0).total_cmp(&float_value(&other.0)),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Integer representation of JSON numbers for exact comparison.
#[derive(Clone, Copy)]
enum IntegerValue {
    /// Signed integer.
    Signed(i64),
    /// Unsigned integer beyond the signed range.
    Unsigned(u64),
}

/// Extracts an integer value, rejecting decimals.
fn integer_value(value: &serde_json::Number) -> Option<IntegerValue> {
    if let Some(value) = value.as_i64() {
        return Some(IntegerValue::Signed(value));
    }
    value.as_u64().map(IntegerValue::Unsigned)
}

/// Compares two integers across signedness.
fn integer_cmp(left: IntegerValue, right: IntegerValue) -> Ordering {
    match (left, right) {
        (IntegerValue::Signed(left), IntegerValue::Signed(right)) => left.cmp(&right),
        (IntegerValue::Unsigned(left), IntegerValue::Unsigned(right)) => left.cmp(&right),
        (IntegerValue::Signed(left), IntegerValue::Unsigned(right)) => {
            u64::try_from(left).map_or(Ordering::Less, |left| left.cmp(&right))
        }
        (IntegerValue::Unsigned(left), IntegerValue::Signed(right)) => {
            u64::try_from(right).map_or(Ordering::Greater, |right| left.cmp(&right))
        }
    }
}

/// Returns the floating-point view of a number.
fn float_value(value: &serde_json::Number) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

// ============================================================================
// SECTION: Values
// ============================================================================

/// Leaf value inside observed content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Scalar {
    /// JSON null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(Number),
    /// String.
    String(String),
}

/// Observed content: scalar, ordered sequence, or keyed mapping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    /// Leaf value.
    Scalar(Scalar),
    /// Ordered sequence of values.
    Sequence(Vec<Value>),
    /// Keyed mapping with deterministic key order.
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Returns a null scalar.
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Returns a string scalar.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::String(value.into()))
    }

    /// Returns an integer scalar.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::Scalar(Scalar::Number(Number::from(value)))
    }

    /// Returns the string payload of a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the mapping entry for `key` when this is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Returns true for scalars and empty containers.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        match self {
            Self::Scalar(_) => true,
            Self::Sequence(items) => items.is_empty(),
            Self::Mapping(entries) => entries.is_empty(),
        }
    }

    /// Returns a short label for the variant.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    /// Flattens the value into leaf field-paths in path order.
    #[must_use]
    pub fn leaves(&self) -> BTreeMap<FieldPath, Self> {
        let mut out = BTreeMap::new();
        let mut cursor = FieldPath::root();
        collect_leaves(self, &mut cursor, &mut out);
        out
    }
}

/// Recursively records every leaf below `value`.
fn collect_leaves(value: &Value, cursor: &mut FieldPath, out: &mut BTreeMap<FieldPath, Value>) {
    match value {
        Value::Mapping(entries) if !entries.is_empty() => {
            for (key, child) in entries {
                cursor.push_key(key);
                collect_leaves(child, cursor, out);
                cursor.pop();
            }
        }
        Value::Sequence(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                cursor.push_index(index);
                collect_leaves(child, cursor, out);
                cursor.pop();
            }
        }
        _ => {
            out.insert(cursor.clone(), value.clone());
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::Value::from(self.clone());
        let text = serde_json::to_string(&json).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

// ============================================================================
// SECTION: JSON Conversion
// ============================================================================

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Scalar(Scalar::Null),
            serde_json::Value::Bool(flag) => Self::Scalar(Scalar::Bool(flag)),
            serde_json::Value::Number(number) => Self::Scalar(Scalar::Number(Number(number))),
            serde_json::Value::String(text) => Self::Scalar(Scalar::String(text)),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Mapping(
                entries.into_iter().map(|(key, value)| (key, Self::from(value))).collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Scalar(Scalar::Null) => Self::Null,
            Value::Scalar(Scalar::Bool(flag)) => Self::Bool(flag),
            Value::Scalar(Scalar::Number(number)) => Self::Number(number.0),
            Value::Scalar(Scalar::String(text)) => Self::String(text),
            Value::Sequence(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Mapping(entries) => {
                let mut object = serde_json::Map::new();
                for (key, value) in entries {
                    object.insert(key, Self::from(value));
                }
                Self::Object(object)
            }
        }
    }
}
