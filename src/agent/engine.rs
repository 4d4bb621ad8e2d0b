//! Conversation engine
//!
//! Drives one agent's turn loop: send the full history, walk the output items
//! in order, execute tool calls through the registry, and stop at the first
//! message. Nested agents run through the same engine, one call chain deep
//! per delegation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use crate::agent::conversation::ConversationHistory;
use crate::agent::loop_state::LoopState;
use crate::agent::AgentDefinition;
use crate::core::{Config, HistoryEntry, OutputItem, Result, ScribeError};
use crate::llm::{BackendRequest, ReasoningBackend, RetryPolicy};
use crate::tools::context::{AgentRunner, DelegationChain, ToolContext};
use crate::tools::ToolRegistry;

/// Default request budget per agent run
pub const DEFAULT_MAX_TURNS: usize = 32;

/// Result of a completed agent run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final message text
    pub text: String,
    /// Full history of the run
    pub history: Vec<HistoryEntry>,
    /// Backend requests made
    pub turns: usize,
}

/// Turn loop driver shared by every agent in a run
pub struct ConversationEngine {
    backend: Arc<dyn ReasoningBackend>,
    registry: Arc<ToolRegistry>,
    max_turns: usize,
    retry: RetryPolicy,
    debug: bool,
}

impl ConversationEngine {
    /// Create an engine with default limits
    pub fn new(backend: Arc<dyn ReasoningBackend>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            backend,
            registry,
            max_turns: DEFAULT_MAX_TURNS,
            retry: RetryPolicy::default(),
            debug: false,
        }
    }

    /// Create an engine with limits taken from configuration
    pub fn from_config(
        backend: Arc<dyn ReasoningBackend>,
        registry: Arc<ToolRegistry>,
        config: &Config,
    ) -> Self {
        Self::new(backend, registry)
            .with_max_turns(config.engine.max_turns)
            .with_retry_policy(config.backend.retry_policy())
            .with_debug(config.engine.debug)
    }

    /// Set the request budget per agent run
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    /// Set the backend retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Log full tool arguments and outputs
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The registry tools are dispatched through
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Run `agent` as a root agent and return its final text
    pub async fn run(&self, agent: &AgentDefinition, message: Option<String>) -> Result<String> {
        self.run_detailed(agent, message).await.map(|o| o.text)
    }

    /// Run `agent` as a root agent and return the whole outcome
    pub async fn run_detailed(
        &self,
        agent: &AgentDefinition,
        message: Option<String>,
    ) -> Result<RunOutcome> {
        let chain = DelegationChain::new().enter(&agent.name)?;
        self.run_in_chain(agent, message, chain).await
    }

    async fn run_in_chain(
        &self,
        agent: &AgentDefinition,
        message: Option<String>,
        chain: DelegationChain,
    ) -> Result<RunOutcome> {
        let span = tracing::info_span!("agent", name = %agent.name, depth = chain.depth());
        self.run_loop(agent, message, &chain).instrument(span).await
    }

    async fn run_loop(
        &self,
        agent: &AgentDefinition,
        message: Option<String>,
        chain: &DelegationChain,
    ) -> Result<RunOutcome> {
        let tools = self.registry.resolve(&agent.tool_names)?;
        let mut history = ConversationHistory::new(&agent.system_prompt, message);
        let mut state = LoopState::new(self.max_turns);

        tracing::info!(model = %agent.model, tools = tools.len(), "Agent started");

        while state.should_continue() {
            state.next_turn();

            let request = BackendRequest {
                model: &agent.model,
                history: history.entries(),
                tools: &tools,
                options: &agent.options,
            };
            tracing::debug!(turn = state.turn, entries = request.history.len(), "Requesting backend");

            let response = self
                .retry
                .execute(|| self.backend.respond(request))
                .await?;

            for item in response.items {
                match item {
                    OutputItem::FunctionCall {
                        id,
                        call_id,
                        name,
                        arguments,
                    } => {
                        state.executing(&name);
                        let output = self
                            .call_tool(agent, chain, &call_id, &name, &arguments)
                            .await;
                        history.push_tool_exchange(id, call_id, name, arguments, output);
                    }
                    OutputItem::Message { text } => {
                        state.complete();
                        history.push(HistoryEntry::assistant(text.clone()));
                        tracing::info!(
                            turns = state.turn,
                            tool_calls = state.tool_calls,
                            "Agent complete"
                        );
                        return Ok(RunOutcome {
                            text,
                            history: history.into_entries(),
                            turns: state.turn,
                        });
                    }
                    OutputItem::Reasoning(item) => {
                        tracing::debug!("Agent reasoned");
                        history.push(HistoryEntry::Reasoning { item });
                    }
                    OutputItem::Unknown(item) => {
                        tracing::error!(item = %item, "Unrecognized output item");
                    }
                }
            }
        }

        Err(ScribeError::TurnLimitExceeded {
            agent: agent.name.clone(),
            max_turns: self.max_turns,
        })
    }

    /// Execute one tool call and serialize its result for the history
    async fn call_tool(
        &self,
        agent: &AgentDefinition,
        chain: &DelegationChain,
        call_id: &str,
        name: &str,
        arguments: &str,
    ) -> String {
        tracing::info!(tool = name, call_id, "Calling tool");
        if self.debug {
            tracing::info!(tool = name, arguments, "Tool arguments");
        }

        let output = if agent.tool_names.iter().any(|t| t == name) {
            let ctx = ToolContext {
                call_id,
                agent: &agent.name,
                chain,
                runner: self,
            };
            self.registry.invoke(name, arguments, &ctx).await
        } else {
            ScribeError::UnknownTool(name.to_string()).to_payload()
        };

        let output = output.to_string();
        if self.debug {
            tracing::info!(tool = name, output = %output, "Tool output");
        }
        output
    }
}

#[async_trait]
impl AgentRunner for ConversationEngine {
    async fn run_agent(
        &self,
        agent: &AgentDefinition,
        message: Option<String>,
        chain: DelegationChain,
    ) -> Result<String> {
        self.run_in_chain(agent, message, chain)
            .await
            .map(|outcome| outcome.text)
    }
}

impl std::fmt::Debug for ConversationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationEngine")
            .field("backend", &self.backend.name())
            .field("max_turns", &self.max_turns)
            .field("retry", &self.retry)
            .field("debug", &self.debug)
            .finish()
    }
}
