//! OpenAI Responses API client
//!
//! Async HTTP client that replays the whole history as Responses input items
//! and decodes the returned output items.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::config::BackendConfig;
use crate::core::{HistoryEntry, OutputItem, Result, ScribeError, ToolDefinition};
use crate::llm::traits::{BackendRequest, BackendResponse, ReasoningBackend, TokenUsage};

/// OpenAI Responses API client
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Responses request body
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<Value>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
    #[serde(flatten)]
    options: &'a serde_json::Map<String, Value>,
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

/// Responses response body
#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<Value>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Option<UsageBody>,
}

#[derive(Debug, Deserialize)]
struct UsageBody {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl OpenAiBackend {
    /// Create a client from configuration; the API key is read from the environment
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ScribeError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key()?,
        })
    }

    /// Convert a history entry to a Responses input item
    pub(crate) fn to_input_item(entry: &HistoryEntry) -> Value {
        match entry {
            HistoryEntry::System { text } => json!({ "role": "system", "content": text }),
            HistoryEntry::User { text } => json!({ "role": "user", "content": text }),
            HistoryEntry::AssistantMessage { text } => {
                json!({ "role": "assistant", "content": text })
            }
            HistoryEntry::ToolCall {
                id,
                call_id,
                name,
                arguments,
            } => {
                let mut item = json!({
                    "type": "function_call",
                    "call_id": call_id,
                    "name": name,
                    "arguments": arguments,
                });
                if let Some(id) = id {
                    item["id"] = Value::String(id.clone());
                }
                item
            }
            HistoryEntry::ToolResult { call_id, output } => json!({
                "type": "function_call_output",
                "call_id": call_id,
                "output": output,
            }),
            HistoryEntry::Reasoning { item } => item.clone(),
        }
    }

    /// Convert a Responses output item to an OutputItem
    fn to_output_item(item: Value) -> OutputItem {
        match item.get("type").and_then(Value::as_str) {
            Some("function_call") => {
                let id = item.get("id").and_then(Value::as_str).map(str::to_string);
                let call_id = item
                    .get("call_id")
                    .or_else(|| item.get("id"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let name = item
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let arguments = match item.get("arguments") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => "{}".to_string(),
                };
                OutputItem::FunctionCall {
                    id,
                    call_id,
                    name,
                    arguments,
                }
            }
            Some("message") => {
                let text = item
                    .get("content")
                    .and_then(Value::as_array)
                    .map(|parts| {
                        parts
                            .iter()
                            .filter(|p| {
                                matches!(
                                    p.get("type").and_then(Value::as_str),
                                    Some("output_text") | Some("text")
                                )
                            })
                            .filter_map(|p| p.get("text").and_then(Value::as_str))
                            .collect::<String>()
                    })
                    .unwrap_or_default();
                OutputItem::Message { text }
            }
            Some("reasoning") => OutputItem::Reasoning(item),
            _ => OutputItem::Unknown(item),
        }
    }

    fn to_backend_response(body: ResponsesBody) -> BackendResponse {
        BackendResponse {
            items: body.output.into_iter().map(Self::to_output_item).collect(),
            usage: body.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
                total_tokens: u.total_tokens,
            }),
            model: body.model,
        }
    }
}

#[async_trait]
impl ReasoningBackend for OpenAiBackend {
    async fn respond(&self, request: BackendRequest<'_>) -> Result<BackendResponse> {
        let body = ResponsesRequest {
            model: request.model,
            input: request.history.iter().map(Self::to_input_item).collect(),
            tools: request.tools,
            options: request.options,
        };

        tracing::debug!(
            model = request.model,
            entries = request.history.len(),
            tools = request.tools.len(),
            "Sending responses request"
        );

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = format!("Responses API error ({}): {}", status, error_text);

            return Err(
                if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    ScribeError::backend(message)
                } else {
                    ScribeError::BackendRejected(message)
                },
            );
        }

        let body: ResponsesBody = response
            .json()
            .await
            .map_err(|e| ScribeError::backend(format!("Failed to parse response: {}", e)))?;

        Ok(Self::to_backend_response(body))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_conversion() {
        let call = HistoryEntry::ToolCall {
            id: None,
            call_id: "call_1".into(),
            name: "get_transcript".into(),
            arguments: "{}".into(),
        };
        let item = OpenAiBackend::to_input_item(&call);
        assert_eq!(item["type"], "function_call");
        assert_eq!(item["call_id"], "call_1");

        let result = HistoryEntry::ToolResult {
            call_id: "call_1".into(),
            output: "\"hello\"".into(),
        };
        let item = OpenAiBackend::to_input_item(&result);
        assert_eq!(item["type"], "function_call_output");
        assert_eq!(item["output"], "\"hello\"");

        let item = OpenAiBackend::to_input_item(&HistoryEntry::system("be brief"));
        assert_eq!(item["role"], "system");
    }

    #[test]
    fn test_output_decoding() {
        let body: ResponsesBody = serde_json::from_value(json!({
            "model": "gpt-5-mini",
            "output": [
                { "type": "reasoning", "id": "rs_1", "summary": [] },
                { "type": "function_call", "call_id": "c1", "name": "talk_to_user", "arguments": "{\"message\":\"hi\"}" },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "Hello, " },
                    { "type": "output_text", "text": "world" }
                ]},
                { "type": "web_search_call", "id": "ws_1" }
            ],
            "usage": { "input_tokens": 10, "output_tokens": 5, "total_tokens": 15 }
        }))
        .unwrap();

        let response = OpenAiBackend::to_backend_response(body);
        let kinds: Vec<_> = response.items.iter().map(OutputItem::kind).collect();
        assert_eq!(kinds, ["reasoning", "function_call", "message", "unknown"]);
        assert_eq!(response.items[2], OutputItem::message("Hello, world"));
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_function_call_keeps_reasoning_pairing_on_replay() {
        use crate::agent::{AgentDefinition, ConversationEngine};
        use crate::llm::{RetryPolicy, ScriptedBackend};
        use crate::tools::{FnTool, ToolRegistry};
        use std::sync::Arc;

        let body: ResponsesBody = serde_json::from_value(json!({
            "output": [
                { "type": "reasoning", "id": "rs_1", "summary": [] },
                { "type": "function_call", "id": "fc_1", "call_id": "call_1",
                  "name": "get_transcript", "arguments": "{}" }
            ]
        }))
        .unwrap();
        let first = OpenAiBackend::to_backend_response(body).items;

        let backend = Arc::new(ScriptedBackend::sequence(vec![
            first,
            vec![OutputItem::message("done")],
        ]));
        let mut registry = ToolRegistry::new();
        registry
            .register(FnTool::new(
                "get_transcript",
                "Transcript",
                crate::tools::tool::no_parameters(),
                |_| async { Ok(json!("hello")) },
            ))
            .unwrap();
        let engine = ConversationEngine::new(backend.clone(), Arc::new(registry))
            .with_retry_policy(RetryPolicy::none());

        let agent = AgentDefinition::new("reader", "Read.").with_tools(["get_transcript"]);
        engine.run(&agent, None).await.unwrap();

        let requests = backend.requests();
        let replay: Vec<Value> = requests[1]
            .history
            .iter()
            .map(OpenAiBackend::to_input_item)
            .collect();

        assert_eq!(replay[1]["type"], "reasoning");
        assert_eq!(replay[1]["id"], "rs_1");
        assert_eq!(replay[2]["type"], "function_call");
        assert_eq!(replay[2]["id"], "fc_1");
        assert_eq!(replay[2]["call_id"], "call_1");
        assert_eq!(replay[3]["type"], "function_call_output");
        assert_eq!(replay[3]["call_id"], "call_1");
    }

    #[test]
    fn test_request_flattens_options() {
        let mut options = serde_json::Map::new();
        options.insert("reasoning".into(), json!({ "effort": "low" }));
        let body = ResponsesRequest {
            model: "gpt-5-mini",
            input: vec![],
            tools: &[],
            options: &options,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["reasoning"]["effort"], "low");
        assert!(value.get("tools").is_none());
    }
}
