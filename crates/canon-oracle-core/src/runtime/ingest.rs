// crates/canon-oracle-core/src/runtime/ingest.rs
// ============================================================================
// Module: Canon Oracle Artifact Ingestion
// Description: Parsers for the raw event log and the final resource listing.
// Purpose: Turn a run's raw artifacts into a History and a StateSnapshot.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! The event log is a mixed text log. Only lines containing
//! [`EVENT_MARKER`] are events, laid out as
//! `[API-EVENT]\t<operation>\t<json object>`. Sequence numbers are assigned
//! from 1 in log order. The resource listing is either a JSON array of
//! objects or an object with an `items` array.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Event;
use crate::core::History;
use crate::core::Operation;
use crate::core::ParseError;
use crate::core::StateSnapshot;
use crate::core::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Marker identifying event lines inside the raw event log.
pub const EVENT_MARKER: &str = "[API-EVENT]";

// ============================================================================
// SECTION: Event Log
// ============================================================================

/// Parses the raw event log into a history.
///
/// # Errors
///
/// Returns [`ParseError::Line`] for the first malformed event line.
pub fn parse_event_log(log: &str) -> Result<History, ParseError> {
    let mut events = Vec::new();
    let mut sequence_number = 0u64;
    for (index, line) in log.lines().enumerate() {
        let Some(start) = line.find(EVENT_MARKER) else {
            continue;
        };
        let line_number = index + 1;
        let payload = &line[start + EVENT_MARKER.len() ..];
        sequence_number += 1;
        let event = parse_event_line(payload, sequence_number).map_err(|err| ParseError::Line {
            line: line_number,
            reason: err.to_string(),
        })?;
        events.push(event);
    }
    History::new(events)
}

/// Parses the text following the event marker.
fn parse_event_line(payload: &str, sequence_number: u64) -> Result<Event, ParseError> {
    let payload = payload
        .strip_prefix('\t')
        .ok_or_else(|| ParseError::Json("expected tab after event marker".to_string()))?;
    let (operation, body) = payload
        .split_once('\t')
        .ok_or_else(|| ParseError::Json("expected <operation>\\t<object>".to_string()))?;
    let operation: Operation = operation.parse()?;
    let object = parse_object(body.trim())?;
    Event::from_object(operation, &object, sequence_number)
}

/// Parses a JSON object into a value.
fn parse_object(text: &str) -> Result<Value, ParseError> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|err| ParseError::Json(err.to_string()))?;
    if !json.is_object() {
        return Err(ParseError::Json("event payload must be a json object".to_string()));
    }
    Ok(Value::from(json))
}

// ============================================================================
// SECTION: Resource Listing
// ============================================================================

/// Parses the final resource listing into a snapshot.
///
/// # Errors
///
/// Returns [`ParseError`] when the listing is not valid JSON, has an
/// unexpected shape, or names an object twice.
pub fn parse_resource_listing(bytes: &[u8]) -> Result<StateSnapshot, ParseError> {
    let json: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|err| ParseError::Json(err.to_string()))?;
    let items = match json {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut object) => match object.remove("items") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(ParseError::Snapshot(
                    "listing object must carry an `items` array".to_string(),
                ));
            }
        },
        _ => {
            return Err(ParseError::Snapshot(
                "listing must be an array or an object with `items`".to_string(),
            ));
        }
    };
    let mut objects = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(ParseError::Snapshot(format!("item {index} is not an object")));
        }
        objects.push(Value::from(item));
    }
    StateSnapshot::from_objects(objects)
}
