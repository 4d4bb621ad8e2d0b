//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools and routing tool calls to them. Every
//! failure at call time is turned into a structured error payload so the
//! calling loop keeps going.

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use crate::agent::delegation::AgentTool;
use crate::agent::AgentDefinition;
use crate::core::error::panic_message;
use crate::core::{Result, ScribeError, ToolDefinition};
use crate::tools::context::ToolContext;
use crate::tools::state::SessionState;
use crate::tools::tool::{parse_arguments, Tool};
use crate::tools::validation::validate_arguments;

/// Registry of available tools
pub struct ToolRegistry {
    /// Tools indexed by name
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Registration order
    order: Vec<String>,
    /// Slots shared with the builtin tools
    session: Arc<SessionState>,
}

impl ToolRegistry {
    /// Create an empty registry with fresh session slots
    pub fn new() -> Self {
        Self::with_session(Arc::new(SessionState::new()))
    }

    /// Create an empty registry around existing session slots
    pub fn with_session(session: Arc<SessionState>) -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
            session,
        }
    }

    /// Shared session slots
    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    /// Register a tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register an already shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ScribeError::DuplicateToolName(name));
        }

        tracing::debug!(tool = %name, "Registered tool");
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Expose a whole agent as a tool named after it
    pub fn register_agent_as_tool(&mut self, definition: AgentDefinition) -> Result<()> {
        if self.contains(&definition.name) {
            return Err(ScribeError::DuplicateToolName(definition.name));
        }

        let known: HashSet<&str> = self.order.iter().map(String::as_str).collect();
        check_agent_tools(&definition, &known)?;

        self.register(AgentTool::new(definition))
    }

    /// Expose a batch of agents as tools.
    ///
    /// Agents may reference each other in any order. Nothing is registered
    /// unless the whole batch is valid.
    pub fn register_agents<I>(&mut self, definitions: I) -> Result<()>
    where
        I: IntoIterator<Item = AgentDefinition>,
    {
        let definitions: Vec<AgentDefinition> = definitions.into_iter().collect();

        let mut known: HashSet<&str> = self.order.iter().map(String::as_str).collect();
        for definition in &definitions {
            if !known.insert(definition.name.as_str()) {
                return Err(ScribeError::DuplicateToolName(definition.name.clone()));
            }
        }

        for definition in &definitions {
            check_agent_tools(definition, &known)?;
        }

        for definition in definitions {
            self.register(AgentTool::new(definition))?;
        }
        Ok(())
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no tool is registered
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Definitions of all tools, in registration order
    pub fn all_definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Definitions for `names`, in the order given
    pub fn resolve(&self, names: &[String]) -> Result<Vec<ToolDefinition>> {
        names
            .iter()
            .map(|name| {
                self.tools
                    .get(name)
                    .map(|tool| tool.definition())
                    .ok_or_else(|| ScribeError::UnknownTool(name.clone()))
            })
            .collect()
    }

    /// Execute a tool call, turning any failure into an error payload
    pub async fn invoke(&self, name: &str, arguments: &str, ctx: &ToolContext<'_>) -> Value {
        match self.try_invoke(name, arguments, ctx).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(tool = name, kind = e.kind(), error = %e, "Tool call failed");
                e.to_payload()
            }
        }
    }

    /// Execute a tool call, returning the typed error on failure
    pub async fn try_invoke(
        &self,
        name: &str,
        arguments: &str,
        ctx: &ToolContext<'_>,
    ) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| ScribeError::UnknownTool(name.to_string()))?;

        let args = parse_arguments(name, arguments)?;
        validate_arguments(&args, tool.parameters())
            .map_err(|reason| ScribeError::invalid_arguments(name, reason))?;

        tracing::debug!(tool = name, call_id = ctx.call_id, agent = ctx.agent, "Invoking tool");

        match AssertUnwindSafe(tool.invoke(args, ctx)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(ScribeError::tool(format!(
                "tool '{}' panicked: {}",
                name,
                panic_message(panic.as_ref())
            ))),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .field("session", &self.session)
            .finish()
    }
}

/// Every tool an agent names must be known; naming itself is allowed
fn check_agent_tools(definition: &AgentDefinition, known: &HashSet<&str>) -> Result<()> {
    for tool in &definition.tool_names {
        if tool != &definition.name && !known.contains(tool.as_str()) {
            return Err(ScribeError::UnknownAgent {
                agent: definition.name.clone(),
                reason: format!("tool '{}' is not registered", tool),
            });
        }
    }
    Ok(())
}
