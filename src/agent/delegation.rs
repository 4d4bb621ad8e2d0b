//! Agent-as-tool delegation
//!
//! Wraps an agent definition so a parent agent can call it like any other
//! tool. The nested run gets a fresh history; only its final text comes back.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::agent::AgentDefinition;
use crate::core::Result;
use crate::tools::context::ToolContext;
use crate::tools::tool::{parse_args, Tool};

#[derive(Debug, Default, Deserialize)]
struct DelegateArgs {
    #[serde(default)]
    message: Option<String>,
}

/// Tool that runs a whole agent to completion
#[derive(Debug, Clone)]
pub struct AgentTool {
    agent: Arc<AgentDefinition>,
    description: String,
    parameters: Value,
}

impl AgentTool {
    /// Wrap `agent`
    pub fn new(agent: AgentDefinition) -> Self {
        let description = agent.tool_description();
        Self {
            agent: Arc::new(agent),
            description,
            parameters: json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "Optional instructions or data for the agent"
                    }
                }
            }),
        }
    }

    /// The wrapped definition
    pub fn agent(&self) -> &AgentDefinition {
        &self.agent
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.agent.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &Value {
        &self.parameters
    }

    async fn invoke(&self, args: Value, ctx: &ToolContext<'_>) -> Result<Value> {
        let args: DelegateArgs = parse_args(&self.agent.name, args)?;
        let message = args.message.filter(|m| !m.trim().is_empty());
        let chain = ctx.chain.enter(&self.agent.name)?;

        tracing::info!(
            parent = ctx.agent,
            agent = %self.agent.name,
            depth = chain.depth(),
            "Delegating"
        );

        let text = ctx.runner.run_agent(&self.agent, message, chain).await?;
        Ok(Value::String(text))
    }
}
