//! Builtin tools
//!
//! Every module exposes a `register` function; [`register_all`] wires them
//! into a registry in one place.

pub mod cleaner;
pub mod coordinator;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod scripted_channel;
pub mod summarizer;
pub mod transcriber;
pub mod validator;

use std::sync::Arc;

use crate::core::Result;
use crate::llm::ReasoningBackend;
use crate::tools::ToolRegistry;

pub use coordinator::UserChannel;
#[cfg(any(test, feature = "testing"))]
pub use scripted_channel::ScriptedChannel;

/// Collaborators the builtin tools need
#[derive(Clone)]
pub struct BuiltinDeps {
    /// Backend used by the cleaner
    pub backend: Arc<dyn ReasoningBackend>,
    /// Model used by the cleaner
    pub cleaner_model: String,
    /// Channel behind `talk_to_user`
    pub channel: Arc<dyn UserChannel>,
}

/// Register every builtin tool
pub fn register_all(registry: &mut ToolRegistry, deps: BuiltinDeps) -> Result<()> {
    session::register(registry)?;
    coordinator::register(registry, deps.channel)?;
    transcriber::register(registry)?;
    cleaner::register(registry, deps.backend, deps.cleaner_model)?;
    validator::register(registry)?;
    summarizer::register(registry)?;

    tracing::debug!(tools = registry.len(), "Registered builtin tools");
    Ok(())
}
