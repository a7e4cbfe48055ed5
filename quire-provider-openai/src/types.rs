//! OpenAI Chat Completions API request/response types.

use serde::{Deserialize, Serialize};

/// Chat Completions request body.
#[derive(Debug, Serialize)]
pub struct OpenAiRequest {
    /// Model identifier (e.g. "gpt-4o").
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<OpenAiMessage>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Tools available to the model.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<OpenAiTool>,
}

/// A message in Chat Completions format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiMessage {
    /// Role: "system", "user", "assistant", or "tool".
    pub role: String,
    /// Message content. A string on the way out; whatever the API sent on
    /// the way back.
    #[serde(default)]
    pub content: serde_json::Value,
    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiToolCall>>,
    /// The call this message answers (role="tool" only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A tool call requested by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiToolCall {
    /// Identifier for this call.
    #[serde(default)]
    pub id: String,
    /// Always "function".
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    /// The function to call.
    pub function: OpenAiFunctionCall,
}

fn function_type() -> String {
    "function".into()
}

/// A function call within a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiFunctionCall {
    /// Name of the function.
    pub name: String,
    /// Arguments as a JSON-encoded string.
    #[serde(default)]
    pub arguments: String,
}

/// Tool definition.
#[derive(Debug, Serialize)]
pub struct OpenAiTool {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function definition.
    pub function: OpenAiFunction,
}

/// Function definition within a tool.
#[derive(Debug, Serialize)]
pub struct OpenAiFunction {
    /// Function name.
    pub name: String,
    /// Function description.
    pub description: String,
    /// JSON Schema for the parameters.
    pub parameters: serde_json::Value,
}

/// Chat Completions response body.
#[derive(Debug, Deserialize)]
pub struct OpenAiResponse {
    /// Response choices; only the first is used.
    pub choices: Vec<OpenAiChoice>,
    /// Model that generated the response.
    #[serde(default)]
    pub model: String,
    /// Token usage.
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

/// A single response choice.
#[derive(Debug, Deserialize)]
pub struct OpenAiChoice {
    /// The generated message.
    pub message: OpenAiMessage,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage.
#[derive(Debug, Deserialize)]
pub struct OpenAiUsage {
    /// Prompt tokens.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Completion tokens.
    #[serde(default)]
    pub completion_tokens: u64,
}
