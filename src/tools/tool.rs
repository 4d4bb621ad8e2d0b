//! Tool trait and closure-based tool wrapper

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::{Result, ScribeError, ToolDefinition};
use crate::tools::context::ToolContext;

/// A callable the backend can request by name
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the backend calls)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments
    fn parameters(&self) -> &Value;

    /// Definition offered to the backend
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters().clone())
    }

    /// Run the tool with already-validated arguments
    async fn invoke(&self, args: Value, ctx: &ToolContext<'_>) -> Result<Value>;
}

type Handler = dyn Fn(Value) -> Pin<Box<dyn Future<Output = Result<Value>> + Send>> + Send + Sync;

/// Tool built from a closure
pub struct FnTool {
    name: String,
    description: String,
    parameters: Value,
    handler: Arc<Handler>,
}

impl FnTool {
    /// Create a tool from an async closure over the raw arguments
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: F,
    ) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &Value {
        &self.parameters
    }

    async fn invoke(&self, args: Value, _ctx: &ToolContext<'_>) -> Result<Value> {
        (self.handler)(args).await
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Schema for a tool that takes no arguments
pub fn no_parameters() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

/// Parse the raw argument string sent by the backend.
///
/// Blank input means no arguments. A JSON string that itself holds JSON is
/// unwrapped once, since some models double-encode.
pub fn parse_arguments(tool: &str, raw: &str) -> Result<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ScribeError::invalid_arguments(tool, format!("malformed JSON: {}", e)))?;

    match value {
        Value::String(inner) if inner.trim().starts_with('{') => serde_json::from_str(&inner)
            .map_err(|e| ScribeError::invalid_arguments(tool, format!("malformed JSON: {}", e))),
        other => Ok(other),
    }
}

/// Deserialize arguments into the tool's typed argument struct
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| ScribeError::invalid_arguments(tool, e.to_string()))
}
