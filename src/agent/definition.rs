//! Static agent definitions
//!
//! An agent is a named prompt, a list of tools it may call, and the backend
//! parameters used for its turn loop. Definitions are loaded once and never
//! mutated.

use serde::{Deserialize, Serialize};

fn default_model() -> String {
    "gpt-5-mini".to_string()
}

/// Description of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Unique agent name; also the tool name when delegated to
    pub name: String,
    /// System prompt seeding every conversation
    #[serde(rename = "prompt", alias = "system_prompt")]
    pub system_prompt: String,
    /// Tools this agent may call, in the order offered to the backend
    #[serde(rename = "tools", default)]
    pub tool_names: Vec<String>,
    /// Backend model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Description shown to parents that delegate to this agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Extra request fields forwarded verbatim to the backend
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl AgentDefinition {
    /// Create a definition with the default model and no tools
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            tool_names: Vec::new(),
            model: default_model(),
            description: None,
            options: serde_json::Map::new(),
        }
    }

    /// Set the allowed tools, dropping repeated names
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_names.clear();
        for tool in tools {
            let tool = tool.into();
            if !self.tool_names.contains(&tool) {
                self.tool_names.push(tool);
            }
        }
        self
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the delegation description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a backend option
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Description used when this agent is exposed as a tool
    pub fn tool_description(&self) -> String {
        self.description.clone().unwrap_or_else(|| {
            format!(
                "Delegate to the '{}' agent. Optionally pass it a message; returns its final answer.",
                self.name
            )
        })
    }
}
