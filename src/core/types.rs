//! Shared types used across Scribe modules
//!
//! Contains conversation entries, tool definitions, and backend output items.

use serde::{Deserialize, Serialize};

/// One entry of a conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEntry {
    /// System prompt
    System { text: String },
    /// Message from the user (or the delegating agent)
    User { text: String },
    /// Final assistant message
    AssistantMessage { text: String },
    /// Function call emitted by the backend
    ToolCall {
        /// Backend item id, replayed so the call stays paired with its reasoning
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        call_id: String,
        name: String,
        arguments: String,
    },
    /// Serialized output of a tool call
    ToolResult { call_id: String, output: String },
    /// Opaque reasoning item, replayed verbatim
    Reasoning { item: serde_json::Value },
}

impl HistoryEntry {
    /// Create a system entry
    pub fn system(text: impl Into<String>) -> Self {
        Self::System { text: text.into() }
    }

    /// Create a user entry
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    /// Create an assistant message entry
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::AssistantMessage { text: text.into() }
    }

    /// Call id for tool call / tool result entries
    pub fn call_id(&self) -> Option<&str> {
        match self {
            Self::ToolCall { call_id, .. } | Self::ToolResult { call_id, .. } => Some(call_id),
            _ => None,
        }
    }
}

/// Definition of a tool that can be offered to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (always "function" for now)
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// JSON Schema for the parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new function tool definition
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// One item of a backend response
#[derive(Debug, Clone, PartialEq)]
pub enum OutputItem {
    /// The backend wants a tool invoked
    FunctionCall {
        /// Backend item id, when the backend assigns one
        id: Option<String>,
        call_id: String,
        name: String,
        arguments: String,
    },
    /// Final text for this turn loop
    Message { text: String },
    /// Reasoning trace, kept only for replay and logging
    Reasoning(serde_json::Value),
    /// Anything the engine does not understand
    Unknown(serde_json::Value),
}

impl OutputItem {
    /// Create a function call item
    pub fn function_call(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self::FunctionCall {
            id: None,
            call_id: call_id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Attach the backend item id to a function call
    pub fn with_item_id(self, item_id: impl Into<String>) -> Self {
        match self {
            Self::FunctionCall {
                call_id,
                name,
                arguments,
                ..
            } => Self::FunctionCall {
                id: Some(item_id.into()),
                call_id,
                name,
                arguments,
            },
            other => other,
        }
    }

    /// Create a message item
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FunctionCall { .. } => "function_call",
            Self::Message { .. } => "message",
            Self::Reasoning(_) => "reasoning",
            Self::Unknown(_) => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition_serializes_flat() {
        let def = ToolDefinition::function("echo", "Echo text", serde_json::json!({}));
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["name"], "echo");
    }

    #[test]
    fn test_call_id() {
        let entry = HistoryEntry::ToolResult {
            call_id: "c1".into(),
            output: "\"ok\"".into(),
        };
        assert_eq!(entry.call_id(), Some("c1"));
        assert_eq!(HistoryEntry::user("hi").call_id(), None);
    }

    #[test]
    fn test_tool_call_item_id_is_optional_in_json() {
        let entry: HistoryEntry = serde_json::from_value(serde_json::json!({
            "kind": "tool_call",
            "call_id": "c1",
            "name": "echo",
            "arguments": "{}"
        }))
        .unwrap();
        assert!(matches!(entry, HistoryEntry::ToolCall { id: None, .. }));

        let call = OutputItem::function_call("c1", "echo", "{}").with_item_id("fc_1");
        assert!(matches!(call, OutputItem::FunctionCall { id: Some(ref id), .. } if id == "fc_1"));
        assert_eq!(OutputItem::message("hi").with_item_id("x"), OutputItem::message("hi"));
    }
}
