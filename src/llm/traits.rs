//! Reasoning backend trait
//!
//! The backend is a request/response oracle: it sees the whole history and the
//! offered tools, and answers with an ordered list of output items.

use async_trait::async_trait;

use crate::core::{HistoryEntry, OutputItem, Result, ToolDefinition};

/// One request to the backend
#[derive(Debug, Clone, Copy)]
pub struct BackendRequest<'a> {
    /// Model identifier
    pub model: &'a str,
    /// Full accumulated history
    pub history: &'a [HistoryEntry],
    /// Tools the agent may call
    pub tools: &'a [ToolDefinition],
    /// Extra request fields, forwarded verbatim
    pub options: &'a serde_json::Map<String, serde_json::Value>,
}

/// Response from the backend
#[derive(Debug, Clone, Default)]
pub struct BackendResponse {
    /// Output items in the order the backend produced them
    pub items: Vec<OutputItem>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the response
    pub model: String,
}

impl BackendResponse {
    /// Response made of the given items
    pub fn from_items(items: Vec<OutputItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// Trait for reasoning backends
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Produce the next output items for `request`
    async fn respond(&self, request: BackendRequest<'_>) -> Result<BackendResponse>;

    /// Get the backend name
    fn name(&self) -> &str;
}
