//! The reasoning engine's final-answer shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The content of an engine reply, in whichever shape the engine used.
///
/// Engines answer with a plain string, a list of content blocks, a
/// text-bearing object, or something else entirely. Callers turn this into
/// one string with the agent crate's `normalize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FinalContent {
    /// A plain string.
    PlainText(String),
    /// An ordered list of blocks; each is usually `{"type": "text", "text": ...}`.
    BlockList(Vec<Value>),
    /// A single object that usually carries a `text` field.
    TextMapping(Map<String, Value>),
    /// Any other JSON value.
    Opaque(Value),
}

impl FinalContent {
    /// Shorthand for [`FinalContent::PlainText`].
    pub fn text(text: impl Into<String>) -> Self {
        FinalContent::PlainText(text.into())
    }

    /// Classify an arbitrary JSON value by shape.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => FinalContent::PlainText(s),
            Value::Array(items) => FinalContent::BlockList(items),
            Value::Object(map) => FinalContent::TextMapping(map),
            other => FinalContent::Opaque(other),
        }
    }

    /// Whether the content carries nothing worth showing.
    pub fn is_empty(&self) -> bool {
        match self {
            FinalContent::PlainText(s) => s.is_empty(),
            FinalContent::BlockList(items) => items.is_empty(),
            FinalContent::TextMapping(map) => map.is_empty(),
            FinalContent::Opaque(v) => v.is_null(),
        }
    }
}

impl Default for FinalContent {
    fn default() -> Self {
        FinalContent::Opaque(Value::Null)
    }
}

impl From<&str> for FinalContent {
    fn from(s: &str) -> Self {
        FinalContent::PlainText(s.to_owned())
    }
}

impl From<String> for FinalContent {
    fn from(s: String) -> Self {
        FinalContent::PlainText(s)
    }
}
