//! Conversation history entries.
//!
//! A session's history is an ordered `Vec<Turn>`. The agent loop appends
//! to it; providers translate it into their own wire format.

use serde::{Deserialize, Serialize};

/// A request from the reasoning engine to run one named operation.
///
/// `arguments` never carries the target file path. The agent loop
/// supplies the path from session context when it dispatches the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationCall {
    /// Correlates the call with its [`Turn::OperationResult`].
    pub id: String,
    /// Name of the operation in the registry.
    pub name: String,
    /// Argument name to value mapping, as sent by the engine.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl OperationCall {
    /// Create a call with the given id, name, and arguments.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One entry in a session's conversation history.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    /// A message typed by the user.
    User {
        /// The message text.
        text: String,
    },
    /// Instructions from the system.
    System {
        /// The instruction text.
        text: String,
    },
    /// A reply from the reasoning engine.
    Agent {
        /// Text content of the reply (may be empty when only calls were made).
        text: String,
        /// Operations the engine asked to run. Empty for a final answer.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        calls: Vec<OperationCall>,
    },
    /// The outcome of one requested operation.
    OperationResult {
        /// The [`OperationCall::id`] this result answers.
        call_id: String,
        /// The operation name, kept for engines that want it.
        name: String,
        /// Human-readable result or failure text.
        text: String,
        /// Whether the operation failed.
        #[serde(default)]
        is_error: bool,
    },
}

impl Turn {
    /// A user message.
    pub fn user(text: impl Into<String>) -> Self {
        Turn::User { text: text.into() }
    }

    /// A system instruction.
    pub fn system(text: impl Into<String>) -> Self {
        Turn::System { text: text.into() }
    }

    /// An engine reply with no operation calls.
    pub fn agent(text: impl Into<String>) -> Self {
        Turn::Agent {
            text: text.into(),
            calls: Vec::new(),
        }
    }

    /// The calls requested by this turn, if it is an agent turn.
    pub fn calls(&self) -> &[OperationCall] {
        match self {
            Turn::Agent { calls, .. } => calls,
            _ => &[],
        }
    }
}

/// Check the history invariant: every agent turn with calls is followed,
/// before the next user turn, by exactly one result per call in call order.
///
/// Returns the index of the first offending agent turn.
pub fn find_unanswered_call(history: &[Turn]) -> Option<usize> {
    let mut idx = 0;
    while idx < history.len() {
        let calls = history[idx].calls();
        if calls.is_empty() {
            idx += 1;
            continue;
        }
        for (offset, call) in calls.iter().enumerate() {
            match history.get(idx + 1 + offset) {
                Some(Turn::OperationResult { call_id, .. }) if *call_id == call.id => {}
                _ => return Some(idx),
            }
        }
        idx += 1 + calls.len();
    }
    None
}
