//! Request and response types exchanged with a [`Provider`](crate::Provider).
//!
//! Conversation content is carried as [`Turn`]s; each provider translates
//! turns into its own wire format and translates the reply back.

use quire_types::{FinalContent, OperationCall, Turn};
use serde::{Deserialize, Serialize};

/// JSON Schema description of an operation for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Operation name.
    pub name: String,
    /// Human-readable description used by the engine to pick operations.
    pub description: String,
    /// JSON Schema for the operation's arguments.
    pub input_schema: serde_json::Value,
}

/// Request sent to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Model to use (None = provider default).
    pub model: Option<String>,
    /// System context, regenerated for every request.
    pub system: Option<String>,
    /// Conversation history, oldest first.
    pub turns: Vec<Turn>,
    /// Available operations.
    pub tools: Vec<ToolSchema>,
    /// Maximum output tokens.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Provider-specific config passthrough.
    #[serde(default)]
    pub extra: serde_json::Value,
}

/// Why the provider stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Model produced a final response.
    EndTurn,
    /// Model wants to run operations.
    ToolUse,
    /// Hit the max_tokens limit.
    MaxTokens,
    /// Content was filtered by safety.
    ContentFilter,
}

/// Token usage from a single provider call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens consumed.
    pub input_tokens: u64,
    /// Output tokens generated.
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Add another call's usage to this total.
    pub fn accumulate(&mut self, other: &TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// Response from a provider.
///
/// A reply with at least one entry in `calls` asks the agent to run
/// operations; a reply without calls is the final answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Reply content in whatever shape the engine produced.
    pub content: FinalContent,
    /// Requested operation calls, in the order they should run.
    #[serde(default)]
    pub calls: Vec<OperationCall>,
    /// Why the provider stopped.
    pub stop_reason: StopReason,
    /// Token usage.
    #[serde(default)]
    pub usage: TokenUsage,
    /// Actual model used.
    pub model: String,
}

impl ProviderResponse {
    /// A final answer with no calls.
    pub fn final_answer(content: impl Into<FinalContent>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            calls: Vec::new(),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
            model: model.into(),
        }
    }

    /// A reply requesting the given calls.
    pub fn with_calls(calls: Vec<OperationCall>, model: impl Into<String>) -> Self {
        Self {
            content: FinalContent::default(),
            calls,
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
            model: model.into(),
        }
    }
}
