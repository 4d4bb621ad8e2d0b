//! Agent orchestrator
//!
//! Owns everything one run needs (configuration, backend, registry, engine)
//! and is passed around explicitly instead of living in globals. Built once
//! at startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::agent::engine::ConversationEngine;
use crate::agent::AgentDefinition;
use crate::cli::ConsoleChannel;
use crate::core::{Config, Result, ScribeError};
use crate::job::{validate_audio_path, BackgroundJobHandle, CommandTranscriber, Transcriber};
use crate::llm::{OpenAiBackend, ReasoningBackend};
use crate::tools::builtin::{self, BuiltinDeps, UserChannel};
use crate::tools::{SessionState, ToolRegistry};

/// Name of the background transcription job
pub const TRANSCRIPTION_JOB: &str = "transcription";

/// Context object for one run
pub struct Orchestrator {
    /// Configuration
    config: Config,
    /// Reasoning backend shared by every agent
    backend: Arc<dyn ReasoningBackend>,
    /// Tool registry, including every agent as a tool
    registry: Arc<ToolRegistry>,
    /// Turn loop driver
    engine: ConversationEngine,
}

impl Orchestrator {
    /// Build with the OpenAI backend and the console as user channel
    pub fn from_config(config: Config) -> Result<Self> {
        let backend = Arc::new(OpenAiBackend::from_config(&config.backend)?);
        Self::new(config, backend, Arc::new(ConsoleChannel::new()))
    }

    /// Build with explicit collaborators
    pub fn new(
        config: Config,
        backend: Arc<dyn ReasoningBackend>,
        channel: Arc<dyn UserChannel>,
    ) -> Result<Self> {
        let mut registry = ToolRegistry::new();
        builtin::register_all(
            &mut registry,
            BuiltinDeps {
                backend: Arc::clone(&backend),
                cleaner_model: config.cleaner.model.clone(),
                channel,
            },
        )?;
        registry.register_agents(config.agents.iter().cloned())?;

        tracing::info!(
            backend = backend.name(),
            tools = registry.len(),
            agents = config.agents.len(),
            root = %config.main,
            "Orchestrator ready"
        );

        let registry = Arc::new(registry);
        let engine = ConversationEngine::from_config(
            Arc::clone(&backend),
            Arc::clone(&registry),
            &config,
        );

        Ok(Self {
            config,
            backend,
            registry,
            engine,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the backend
    pub fn backend(&self) -> &Arc<dyn ReasoningBackend> {
        &self.backend
    }

    /// Get the tool registry
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Get the engine
    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    /// Get the session slots
    pub fn session(&self) -> &SessionState {
        self.registry.session()
    }

    /// Validate and record the input audio file
    pub fn set_artifact(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        validate_audio_path(&path, &self.config.transcription.allowed_extensions)?;
        self.session().set_artifact(path)
    }

    /// Start transcribing the recorded artifact in the background
    pub fn start_transcription(
        &self,
        transcriber: Arc<dyn Transcriber>,
    ) -> Result<BackgroundJobHandle> {
        let path = self
            .session()
            .artifact()
            .map(Path::to_path_buf)
            .ok_or_else(|| ScribeError::InvalidArtifact("no input artifact is set".to_string()))?;

        let job = BackgroundJobHandle::new(TRANSCRIPTION_JOB);
        self.session().set_job(job.clone())?;
        job.start(move || async move { transcriber.transcribe(&path).await })?;
        Ok(job)
    }

    /// Start transcription with the configured external command
    pub fn start_default_transcription(&self) -> Result<BackgroundJobHandle> {
        let transcriber = CommandTranscriber::from_config(&self.config.transcription);
        self.start_transcription(Arc::new(transcriber))
    }

    /// Look up an agent by name
    pub fn agent(&self, name: &str) -> Result<&AgentDefinition> {
        self.config.agent(name).ok_or_else(|| ScribeError::UnknownAgent {
            agent: name.to_string(),
            reason: "no such agent is defined".to_string(),
        })
    }

    /// Run a named agent to completion
    pub async fn run_agent(&self, name: &str, message: Option<String>) -> Result<String> {
        let agent = self.agent(name)?;
        self.engine.run(agent, message).await
    }

    /// Run the root agent to completion
    pub async fn run_main(&self, message: Option<String>) -> Result<String> {
        self.run_agent(&self.config.main, message).await
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("main", &self.config.main)
            .field("registry", &self.registry)
            .field("engine", &self.engine)
            .finish()
    }
}
