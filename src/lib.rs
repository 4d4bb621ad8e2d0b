//! Scribe - hierarchical agent orchestration for audio transcripts
//!
//! A team of agents, driven by a reasoning backend, turns an audio file into
//! a cleaned, validated, and summarized transcript. Agents call plain tools,
//! wait on a background transcription job, and delegate to each other as if
//! other agents were tools.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Reasoning backend abstraction, OpenAI client, retry policy
//! - **Job**: Run-once background jobs and the transcription launcher
//! - **Tools**: Tool registry, session slots, and builtin tools
//! - **Agent**: Turn-loop engine, delegation, and the orchestrator
//! - **CLI**: Console user channel
//!
//! # Usage
//!
//! ```rust,no_run
//! use scribe::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> scribe::Result<()> {
//!     let orchestrator = Orchestrator::from_config(Config::load(None)?)?;
//!     orchestrator.set_artifact("meeting.mp3")?;
//!     orchestrator.start_default_transcription()?;
//!
//!     let answer = orchestrator.run_main(None).await?;
//!     println!("{}", answer);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod core;
pub mod job;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use crate::agent::{AgentDefinition, ConversationEngine, Orchestrator};
pub use crate::core::{Config, Result, ScribeError};
pub use crate::job::BackgroundJobHandle;
pub use crate::tools::ToolRegistry;
