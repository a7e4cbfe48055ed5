#![deny(missing_docs)]
//! OpenAI engine for quire-turn.
//!
//! Implements [`quire_turn::Provider`] over the Chat Completions endpoint
//! (`POST {base_url}/v1/chat/completions`) with function calling.

mod error;
pub mod types;

use std::time::Duration;

use quire_turn::provider::{Provider, ProviderError};
use quire_turn::types::*;
use quire_types::{FinalContent, OperationCall, Turn};
use types::*;

/// Model used when neither the request nor the provider names one.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Base URL of the public API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// How long one completion may take before it fails as retryable.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI Chat Completions provider.
pub struct OpenAi {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAi {
    /// Create a provider that authenticates with `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override how long one completion may take.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the default model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the base URL (proxies, compatible servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The full completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Translate a provider request into a Chat Completions body.
    pub fn build_request(&self, request: &ProviderRequest) -> OpenAiRequest {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());

        let mut messages = Vec::with_capacity(request.turns.len() + 1);
        if let Some(system) = &request.system {
            messages.push(text_message("system", system));
        }
        for turn in &request.turns {
            match turn {
                Turn::User { text } => messages.push(text_message("user", text)),
                Turn::System { text } => messages.push(text_message("system", text)),
                Turn::Agent { text, calls } => {
                    let tool_calls: Vec<OpenAiToolCall> = calls
                        .iter()
                        .map(|call| OpenAiToolCall {
                            id: call.id.clone(),
                            call_type: "function".into(),
                            function: OpenAiFunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.to_string(),
                            },
                        })
                        .collect();
                    let content = if text.is_empty() && !tool_calls.is_empty() {
                        serde_json::Value::Null
                    } else {
                        serde_json::Value::String(text.clone())
                    };
                    messages.push(OpenAiMessage {
                        role: "assistant".into(),
                        content,
                        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                        tool_call_id: None,
                    });
                }
                Turn::OperationResult { call_id, text, .. } => messages.push(OpenAiMessage {
                    role: "tool".into(),
                    content: serde_json::Value::String(text.clone()),
                    tool_calls: None,
                    tool_call_id: Some(call_id.clone()),
                }),
                _ => {}
            }
        }

        let tools = request
            .tools
            .iter()
            .map(|t| OpenAiTool {
                tool_type: "function".into(),
                function: OpenAiFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.input_schema.clone(),
                },
            })
            .collect();

        OpenAiRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools,
        }
    }

    /// Translate a Chat Completions body into a provider response.
    pub fn parse_response(
        &self,
        response: OpenAiResponse,
    ) -> Result<ProviderResponse, ProviderError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".into()))?;

        let calls: Vec<OperationCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                OperationCall::new(
                    tc.id,
                    tc.function.name,
                    parse_arguments(&tc.function.arguments),
                )
            })
            .collect();

        let stop_reason = if !calls.is_empty() {
            StopReason::ToolUse
        } else {
            match choice.finish_reason.as_deref() {
                Some("length") => StopReason::MaxTokens,
                Some("content_filter") => StopReason::ContentFilter,
                _ => StopReason::EndTurn,
            }
        };

        let usage = response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(ProviderResponse {
            content: FinalContent::from_value(choice.message.content),
            calls,
            stop_reason,
            usage,
            model: response.model,
        })
    }
}

impl std::fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAi")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Provider for OpenAi {
    fn complete(
        &self,
        request: ProviderRequest,
    ) -> impl std::future::Future<Output = Result<ProviderResponse, ProviderError>> + Send {
        let api_request = self.build_request(&request);
        let http_request = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .timeout(self.timeout)
            .json(&api_request);
        let timeout = self.timeout;

        async move {
            tracing::debug!(
                model = %api_request.model,
                messages = api_request.messages.len(),
                "sending chat completion"
            );
            let http_response = http_request
                .send()
                .await
                .map_err(|e| error::map_reqwest_error(e, timeout))?;

            let status = http_response.status();
            if !status.is_success() {
                let body = http_response.text().await.unwrap_or_default();
                return Err(error::map_http_status(status, &body));
            }

            let api_response: OpenAiResponse = http_response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

            self.parse_response(api_response)
        }
    }
}

fn text_message(role: &str, text: &str) -> OpenAiMessage {
    OpenAiMessage {
        role: role.into(),
        content: serde_json::Value::String(text.to_string()),
        tool_calls: None,
        tool_call_id: None,
    }
}

/// Decode a call's JSON-encoded arguments; anything unparseable becomes `{}`.
fn parse_arguments(raw: &str) -> serde_json::Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        _ => serde_json::Value::Object(serde_json::Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(turns: Vec<Turn>) -> ProviderRequest {
        ProviderRequest {
            model: None,
            system: Some("Edit the file.".into()),
            turns,
            tools: vec![ToolSchema {
                name: "read_word_text".into(),
                description: "Reads all text.".into(),
                input_schema: json!({"type": "object", "properties": {}}),
            }],
            max_tokens: None,
            temperature: Some(0.0),
            extra: json!(null),
        }
    }

    fn response(body: serde_json::Value) -> OpenAiResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn url_joins_base() {
        let p = OpenAi::new("k").base_url("http://localhost:8080/");
        assert_eq!(p.completions_url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(
            OpenAi::new("k").completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn build_simple_request() {
        let p = OpenAi::new("k");
        let api = p.build_request(&request(vec![Turn::user("Hello")]));
        assert_eq!(api.model, DEFAULT_MODEL);
        assert_eq!(api.temperature, Some(0.0));
        assert_eq!(api.messages.len(), 2);
        assert_eq!(api.messages[0].role, "system");
        assert_eq!(api.messages[0].content, json!("Edit the file."));
        assert_eq!(api.messages[1].role, "user");
        assert_eq!(api.tools.len(), 1);
        assert_eq!(api.tools[0].function.name, "read_word_text");

        let body = serde_json::to_value(&api).unwrap();
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["tools"][0]["type"], "function");
    }

    #[test]
    fn system_turns_in_history_stay_in_place() {
        let p = OpenAi::new("k");
        let api = p.build_request(&request(vec![
            Turn::user("Hi"),
            Turn::system("The workbook was replaced."),
            Turn::user("Read it again"),
        ]));
        let roles: Vec<&str> = api.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "system", "user"]);
        assert_eq!(api.messages[2].content, json!("The workbook was replaced."));
    }

    #[test]
    fn request_model_overrides_default() {
        let p = OpenAi::new("k").model("gpt-4o-mini");
        let mut req = request(vec![]);
        assert_eq!(p.build_request(&req).model, "gpt-4o-mini");
        req.model = Some("gpt-5".into());
        assert_eq!(p.build_request(&req).model, "gpt-5");
    }

    #[test]
    fn calls_and_results_map_to_tool_messages() {
        let p = OpenAi::new("k");
        let api = p.build_request(&request(vec![
            Turn::user("read it"),
            Turn::Agent {
                text: String::new(),
                calls: vec![OperationCall::new("call_1", "read_word_text", json!({}))],
            },
            Turn::OperationResult {
                call_id: "call_1".into(),
                name: "read_word_text".into(),
                text: "Hello".into(),
                is_error: false,
            },
            Turn::agent("It says Hello."),
        ]));

        let assistant = &api.messages[2];
        assert_eq!(assistant.role, "assistant");
        assert_eq!(assistant.content, serde_json::Value::Null);
        let calls = assistant.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].function.arguments, "{}");

        let tool = &api.messages[3];
        assert_eq!(tool.role, "tool");
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool.content, json!("Hello"));

        assert_eq!(api.messages[4].content, json!("It says Hello."));
        assert!(api.messages[4].tool_calls.is_none());
    }

    #[test]
    fn parse_text_response() {
        let p = OpenAi::new("k");
        let parsed = p
            .parse_response(response(json!({
                "model": "gpt-4o-2024-08-06",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Done."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            })))
            .unwrap();
        assert_eq!(parsed.content, FinalContent::PlainText("Done.".into()));
        assert!(parsed.calls.is_empty());
        assert_eq!(parsed.stop_reason, StopReason::EndTurn);
        assert_eq!(parsed.usage.input_tokens, 12);
        assert_eq!(parsed.usage.output_tokens, 3);
        assert_eq!(parsed.model, "gpt-4o-2024-08-06");
    }

    #[test]
    fn parse_tool_call_response() {
        let p = OpenAi::new("k");
        let parsed = p
            .parse_response(response(json!({
                "model": "gpt-4o",
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [
                            {"id": "a", "type": "function",
                             "function": {"name": "add_excel_row",
                                          "arguments": "{\"sheet_name\":\"Data\",\"data\":[\"Alice\",30]}"}},
                            {"id": "b", "type": "function",
                             "function": {"name": "read_excel_structure", "arguments": "not json"}}
                        ]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .unwrap();
        assert_eq!(parsed.stop_reason, StopReason::ToolUse);
        assert_eq!(parsed.calls.len(), 2);
        assert_eq!(
            parsed.calls[0].arguments,
            json!({"sheet_name": "Data", "data": ["Alice", 30]})
        );
        assert_eq!(parsed.calls[1].arguments, json!({}));
        assert_eq!(parsed.usage, TokenUsage::default());
    }

    #[test]
    fn finish_reasons() {
        let p = OpenAi::new("k");
        let parse = |reason: &str| {
            p.parse_response(response(json!({
                "choices": [{"message": {"role": "assistant", "content": "x"}, "finish_reason": reason}]
            })))
            .unwrap()
            .stop_reason
        };
        assert_eq!(parse("length"), StopReason::MaxTokens);
        assert_eq!(parse("content_filter"), StopReason::ContentFilter);
    }

    #[test]
    fn empty_choices_is_invalid() {
        let err = OpenAi::new("k")
            .parse_response(response(json!({"choices": []})))
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn debug_hides_key() {
        let shown = format!("{:?}", OpenAi::new("sk-secret"));
        assert!(!shown.contains("sk-secret"));
    }

    #[tokio::test]
    async fn stalled_server_times_out_as_retryable() {
        // Accepts connections into the backlog but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let limit = Duration::from_millis(100);
        let p = OpenAi::new("k").base_url(url).timeout(limit);

        let err = p.complete(request(vec![Turn::user("Hi")])).await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(d) if d == limit), "{err}");
        assert!(err.is_retryable());
        drop(listener);
    }
}
