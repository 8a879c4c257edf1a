// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source references and clause values.
//!
//! Forms written by different front ends address sources either by index
//! (`0`, `1`) or by name (`"0"`, `"orders"`). Both spellings are kept exactly
//! as received so the canonical output echoes the caller's own encoding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one queried source inside a form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceRef {
    Index(u64),
    Name(String),
}

impl SourceRef {
    pub fn name(name: impl Into<String>) -> Self {
        SourceRef::Name(name.into())
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Index(idx) => write!(f, "{}", idx),
            SourceRef::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for SourceRef {
    fn from(idx: u64) -> Self {
        SourceRef::Index(idx)
    }
}

impl From<&str> for SourceRef {
    fn from(name: &str) -> Self {
        SourceRef::Name(name.to_string())
    }
}

/// Base value of a filter clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClauseValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl ClauseValue {
    /// Textual form used when the value is checked against a declared type.
    pub fn as_text(&self) -> String {
        match self {
            ClauseValue::Text(s) => s.clone(),
            ClauseValue::Number(n) => n.to_string(),
            ClauseValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for ClauseValue {
    fn from(s: &str) -> Self {
        ClauseValue::Text(s.to_string())
    }
}
