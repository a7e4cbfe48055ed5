//! Reduce an engine's final answer to one string.

use quire_types::FinalContent;
use serde_json::Value;

/// The text to show the user for `content`. Never fails.
pub fn normalize(content: &FinalContent) -> String {
    match content {
        FinalContent::PlainText(text) => text.clone(),
        FinalContent::BlockList(blocks) => blocks
            .iter()
            .map(block_text)
            .collect::<Vec<_>>()
            .join(" "),
        FinalContent::TextMapping(map) => match map.get("text") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => Value::Object(map.clone()).to_string(),
        },
        FinalContent::Opaque(Value::Null) => String::new(),
        FinalContent::Opaque(Value::String(text)) => text.clone(),
        FinalContent::Opaque(other) => other.to_string(),
    }
}

fn block_text(block: &Value) -> String {
    match block {
        Value::Object(map) => match map.get("text") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
