//! Qualified host type names
//!
//! A `QualifiedName` is a dot-separated path of namespace segments ending in
//! a type identifier (e.g., `engine.objects.Array`). Names are parsed once
//! from caller-supplied strings and never mutated afterwards.

use crate::error::{Result, SandboxError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Immutable, well-formed fully-qualified type name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    segments: Vec<String>,
}

impl QualifiedName {
    /// Parse a dotted name, rejecting empty input and empty or
    /// whitespace-bearing segments
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(SandboxError::invalid_name(raw, "name is empty"));
        }

        let mut segments = Vec::new();
        for (index, segment) in raw.split('.').enumerate() {
            if segment.is_empty() {
                return Err(SandboxError::invalid_name(
                    raw,
                    format!("segment {} is empty", index),
                ));
            }
            if segment.chars().any(|c| c.is_whitespace() || c.is_control()) {
                return Err(SandboxError::invalid_name(
                    raw,
                    format!("segment '{}' contains whitespace or control characters", segment),
                ));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// All segments, including the terminal type identifier
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; a parsed name has at least one segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Terminal type identifier (`Array` in `engine.objects.Array`)
    pub fn simple_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Namespace segments, without the terminal identifier
    pub fn namespace(&self) -> &[String] {
        &self.segments[..self.segments.len().saturating_sub(1)]
    }

    /// True if `self` equals `prefix` or lies beneath it.
    ///
    /// Comparison is by whole segment: `engine.internals` is not nested
    /// under `engine.internal`.
    pub fn is_nested_under(&self, prefix: &QualifiedName) -> bool {
        prefix.segments.len() <= self.segments.len()
            && prefix
                .segments
                .iter()
                .zip(&self.segments)
                .all(|(p, s)| p == s)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for QualifiedName {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = SandboxError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<QualifiedName> for String {
    fn from(name: QualifiedName) -> Self {
        name.to_string()
    }
}
