// crates/canon-oracle-core/src/core/path.rs
// ============================================================================
// Module: Canon Oracle Field Paths
// Description: Concrete field paths and wildcard field patterns.
// Purpose: Address leaves inside observed content and express mask entries.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`FieldPath`] addresses one node inside an object's content using dot
//! and bracket notation (`spec.containers[0].image`). Keys that would be
//! ambiguous in dotted form are written bracket-quoted
//! (`metadata.labels["app.kubernetes.io/name"]`).
//!
//! A [`FieldPattern`] is a mask entry. Its segments may be wildcards: `*`
//! matches any key and `[*]` matches any index. A pattern matches a path when
//! it matches a contiguous run of the path's segments ending at the path's
//! last segment, so a single-segment pattern such as `resourceVersion`
//! applies wherever that key appears.

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

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum length for a hexadecimal token to be treated as generated.
const MIN_GENERATED_HEX_LEN: usize = 8;
/// Canonical length of a hyphenated UUID.
const UUID_LEN: usize = 36;
/// Hyphen offsets inside a hyphenated UUID.
const UUID_HYPHENS: [usize; 4] = [8, 13, 18, 23];

// ============================================================================
// SECTION: Field Paths
// ============================================================================

/// One step inside a concrete field path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
}

/// Concrete path from an object's root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Returns the empty (root) path.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from segments.
    #[must_use]
    pub const fn from_segments(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Returns the path segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Returns true for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a child path addressing a mapping key.
    #[must_use]
    pub fn child_key(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.push_key(key);
        next
    }

    /// Returns a child path addressing a sequence index.
    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.push_index(index);
        next
    }

    /// Appends a key segment in place.
    pub fn push_key(&mut self, key: &str) {
        self.0.push(Segment::Key(key.to_string()));
    }

    /// Appends an index segment in place.
    pub fn push_index(&mut self, index: usize) {
        self.0.push(Segment::Index(index));
    }

    /// Removes the last segment in place.
    pub fn pop(&mut self) {
        self.0.pop();
    }

    /// Returns this path extended by every segment of `suffix`.
    #[must_use]
    pub fn join(&self, suffix: &Self) -> Self {
        let mut segments = self.0.clone();
        segments.extend(suffix.0.iter().cloned());
        Self(segments)
    }

    /// Generalizes the path into a pattern usable across object instances.
    ///
    /// Indices become `[*]` and keys that look like generated identifiers
    /// become `*`. Returns `None` for the root path.
    #[must_use]
    pub fn generalize(&self) -> Option<FieldPattern> {
        if self.0.is_empty() {
            return None;
        }
        let segments = self
            .0
            .iter()
            .map(|segment| match segment {
                Segment::Index(_) => PatternSegment::AnyIndex,
                Segment::Key(key) if looks_generated(key) => PatternSegment::AnyKey,
                Segment::Key(key) => PatternSegment::Key(key.clone()),
            })
            .collect();
        Some(FieldPattern(segments))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) => write_key(f, key, position == 0)?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut segments = Vec::new();
        for token in tokenize(input)? {
            match token {
                RawSegment::Key(key) => segments.push(Segment::Key(key)),
                RawSegment::Index(index) => segments.push(Segment::Index(index)),
                RawSegment::AnyKey | RawSegment::AnyIndex => {
                    return Err(path_error(input, "wildcards are not allowed in concrete paths"));
                }
            }
        }
        Ok(Self(segments))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Field Patterns
// ============================================================================

/// One step inside a field pattern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternSegment {
    /// Exact mapping key.
    Key(String),
    /// Exact sequence index.
    Index(usize),
    /// Any mapping key (`*`).
    AnyKey,
    /// Any sequence index (`[*]`).
    AnyIndex,
}

impl PatternSegment {
    /// Returns true when the pattern segment accepts the path segment.
    fn accepts(&self, segment: &Segment) -> bool {
        match (self, segment) {
            (Self::Key(expected), Segment::Key(actual)) => expected == actual,
            (Self::Index(expected), Segment::Index(actual)) => expected == actual,
            (Self::AnyKey, Segment::Key(_)) | (Self::AnyIndex, Segment::Index(_)) => true,
            _ => false,
        }
    }
}

/// Non-empty field pattern used as a mask entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPattern(Vec<PatternSegment>);

impl FieldPattern {
    /// Returns the pattern segments.
    #[must_use]
    pub fn segments(&self) -> &[PatternSegment] {
        &self.0
    }

    /// Returns true when the pattern matches the tail of `path`.
    #[must_use]
    pub fn matches(&self, path: &FieldPath) -> bool {
        self.matches_segments(path.segments())
    }

    /// Returns true when the pattern matches the tail of `segments`.
    #[must_use]
    pub fn matches_segments(&self, segments: &[Segment]) -> bool {
        let Some(offset) = segments.len().checked_sub(self.0.len()) else {
            return false;
        };
        self.0.iter().zip(&segments[offset ..]).all(|(pattern, segment)| pattern.accepts(segment))
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                PatternSegment::Key(key) => write_key(f, key, position == 0)?,
                PatternSegment::Index(index) => write!(f, "[{index}]")?,
                PatternSegment::AnyKey => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str("*")?;
                }
                PatternSegment::AnyIndex => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPattern {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let segments: Vec<PatternSegment> = tokenize(input)?
            .into_iter()
            .map(|token| match token {
                RawSegment::Key(key) => PatternSegment::Key(key),
                RawSegment::Index(index) => PatternSegment::Index(index),
                RawSegment::AnyKey => PatternSegment::AnyKey,
                RawSegment::AnyIndex => PatternSegment::AnyIndex,
            })
            .collect();
        if segments.is_empty() {
            return Err(path_error(input, "pattern must not be empty"));
        }
        Ok(Self(segments))
    }
}

impl Serialize for FieldPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Generated Identifier Detection
// ============================================================================

/// Returns true when a key looks like a generated identifier.
#[must_use]
pub fn looks_generated(token: &str) -> bool {
    is_uuid(token) || is_numeric(token) || is_hex_token(token)
}

/// Returns true for hyphenated UUIDs.
fn is_uuid(token: &str) -> bool {
    token.len() == UUID_LEN
        && token.char_indices().all(|(index, ch)| {
            if UUID_HYPHENS.contains(&index) { ch == '-' } else { ch.is_ascii_hexdigit() }
        })
}

/// Returns true for non-empty all-digit tokens.
fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|ch| ch.is_ascii_digit())
}

/// Returns true for long hexadecimal tokens that contain a digit.
fn is_hex_token(token: &str) -> bool {
    token.len() >= MIN_GENERATED_HEX_LEN
        && token.chars().all(|ch| ch.is_ascii_hexdigit())
        && token.chars().any(|ch| ch.is_ascii_digit())
}

// ============================================================================
// SECTION: Tokenizer
// ============================================================================

/// Segment produced by the shared path tokenizer.
enum RawSegment {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
    /// Key wildcard.
    AnyKey,
    /// Index wildcard.
    AnyIndex,
}

/// Splits dot/bracket notation into raw segments.
fn tokenize(input: &str) -> Result<Vec<RawSegment>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut segments = Vec::new();
    let mut pos = 0usize;
    while let Some(&ch) = chars.get(pos) {
        match ch {
            '[' => {
                let (segment, next) = parse_bracket(&chars, pos + 1, input)?;
                segments.push(segment);
                pos = next;
            }
            '.' => {
                if segments.is_empty() {
                    return Err(path_error(input, "path must not start with '.'"));
                }
                let (key, next) = read_bare_key(&chars, pos + 1, input)?;
                segments.push(bare_segment(key));
                pos = next;
            }
            _ => {
                if !segments.is_empty() {
                    return Err(path_error(input, "missing separator before key"));
                }
                let (key, next) = read_bare_key(&chars, pos, input)?;
                segments.push(bare_segment(key));
                pos = next;
            }
        }
    }
    Ok(segments)
}

/// Reads an unquoted key up to the next separator.
fn read_bare_key(chars: &[char], start: usize, input: &str) -> Result<(String, usize), ParseError> {
    let mut key = String::new();
    let mut pos = start;
    while let Some(&ch) = chars.get(pos) {
        match ch {
            '.' | '[' => break,
            ']' | '"' | '\\' => {
                return Err(path_error(input, "unexpected character in key"));
            }
            _ => key.push(ch),
        }
        pos += 1;
    }
    if key.is_empty() {
        return Err(path_error(input, "empty key segment"));
    }
    Ok((key, pos))
}

/// Converts a bare key into a raw segment.
fn bare_segment(key: String) -> RawSegment {
    if key == "*" { RawSegment::AnyKey } else { RawSegment::Key(key) }
}

/// Parses the contents of a bracket segment starting after `[`.
fn parse_bracket(
    chars: &[char],
    start: usize,
    input: &str,
) -> Result<(RawSegment, usize), ParseError> {
    match chars.get(start) {
        Some('"') => {
            let mut key = String::new();
            let mut pos = start + 1;
            loop {
                match chars.get(pos) {
                    Some('\\') => {
                        let escaped = chars
                            .get(pos + 1)
                            .ok_or_else(|| path_error(input, "dangling escape"))?;
                        key.push(*escaped);
                        pos += 2;
                    }
                    Some('"') => break,
                    Some(ch) => {
                        key.push(*ch);
                        pos += 1;
                    }
                    None => return Err(path_error(input, "unterminated quoted key")),
                }
            }
            expect_close(chars, pos + 1, input).map(|next| (RawSegment::Key(key), next))
        }
        Some('*') => expect_close(chars, start + 1, input).map(|next| (RawSegment::AnyIndex, next)),
        Some(_) => {
            let mut digits = String::new();
            let mut pos = start;
            while let Some(ch) = chars.get(pos).filter(|ch| ch.is_ascii_digit()) {
                digits.push(*ch);
                pos += 1;
            }
            let index =
                digits.parse::<usize>().map_err(|_| path_error(input, "invalid sequence index"))?;
            expect_close(chars, pos, input).map(|next| (RawSegment::Index(index), next))
        }
        None => Err(path_error(input, "unterminated bracket")),
    }
}

/// Requires a `]` at `pos` and returns the following position.
fn expect_close(chars: &[char], pos: usize, input: &str) -> Result<usize, ParseError> {
    match chars.get(pos) {
        Some(']') => Ok(pos + 1),
        _ => Err(path_error(input, "expected ']'")),
    }
}

/// Writes a key segment, quoting it when dotted form would be ambiguous.
fn write_key(f: &mut fmt::Formatter<'_>, key: &str, first: bool) -> fmt::Result {
    if needs_quoting(key) {
        f.write_str("[\"")?;
        for ch in key.chars() {
            if ch == '"' || ch == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{ch}")?;
        }
        return f.write_str("\"]");
    }
    if !first {
        f.write_str(".")?;
    }
    f.write_str(key)
}

/// Returns true when a key cannot be written in dotted form.
fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key == "*" || key.contains(['.', '[', ']', '"', '\\'])
}

/// Builds a field path parse error.
fn path_error(input: &str, reason: &str) -> ParseError {
    ParseError::FieldPath {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
