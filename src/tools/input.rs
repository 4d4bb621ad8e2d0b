//! Dual-mode text input
//!
//! Some tools accept either a JSON object or free text in the same string
//! argument. The input is classified once, at the tool's entry.

use serde_json::{Map, Value};

/// A string argument that may carry a JSON object
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInput {
    /// Blank input
    Empty,
    /// Anything that is not a JSON object
    PlainText(String),
    /// A JSON object
    Structured(Map<String, Value>),
}

impl ToolInput {
    /// Classify `raw`
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(map)) => Self::Structured(map),
            _ => Self::PlainText(trimmed.to_string()),
        }
    }

    /// Whether the input was blank
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
