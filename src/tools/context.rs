//! Tool invocation context
//!
//! Everything a tool body may need from the loop that called it: the call id,
//! the calling agent, the delegation chain, and a way to run other agents.

use std::fmt;

use async_trait::async_trait;

use crate::agent::AgentDefinition;
use crate::core::{Result, ScribeError};

/// Runs an agent's turn loop to completion
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Run `agent` with an optional opening message, inside `chain`
    async fn run_agent(
        &self,
        agent: &AgentDefinition,
        message: Option<String>,
        chain: DelegationChain,
    ) -> Result<String>;
}

/// Agent names on the current call stack, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationChain {
    agents: Vec<String>,
}

impl DelegationChain {
    /// Empty chain, before the root agent starts
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain extended with `agent`; fails if the agent is already running
    pub fn enter(&self, agent: &str) -> Result<Self> {
        if self.contains(agent) {
            return Err(ScribeError::DelegationCycle(format!("{} -> {}", self, agent)));
        }

        let mut agents = self.agents.clone();
        agents.push(agent.to_string());
        Ok(Self { agents })
    }

    /// Whether `agent` is on the chain
    pub fn contains(&self, agent: &str) -> bool {
        self.agents.iter().any(|a| a == agent)
    }

    /// Nesting depth; the root agent runs at depth 1
    pub fn depth(&self) -> usize {
        self.agents.len()
    }

    /// Innermost agent
    pub fn current(&self) -> Option<&str> {
        self.agents.last().map(String::as_str)
    }
}

impl fmt::Display for DelegationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.agents.join(" -> "))
    }
}

/// Context handed to a tool for one invocation
#[derive(Clone, Copy)]
pub struct ToolContext<'a> {
    /// Call id assigned by the backend
    pub call_id: &'a str,
    /// Name of the agent making the call
    pub agent: &'a str,
    /// Agents currently running, including the caller
    pub chain: &'a DelegationChain,
    /// Runner used by agent-as-tool invocations
    pub runner: &'a dyn AgentRunner,
}

impl fmt::Debug for ToolContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("call_id", &self.call_id)
            .field("agent", &self.agent)
            .field("chain", &self.chain.to_string())
            .finish()
    }
}

/// Runner that refuses to run anything; for tools that never delegate
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRunner;

#[async_trait]
impl AgentRunner for NoRunner {
    async fn run_agent(
        &self,
        agent: &AgentDefinition,
        _message: Option<String>,
        _chain: DelegationChain,
    ) -> Result<String> {
        Err(ScribeError::UnknownAgent {
            agent: agent.name.clone(),
            reason: "no agent runner is available in this context".to_string(),
        })
    }
}
