//! Tools module - Tool implementations for the agents
//!
//! Contains the tool trait, the registry and its session slots, argument
//! handling, and the builtin transcript tools.

pub mod builtin;
pub mod context;
pub mod input;
pub mod registry;
pub mod state;
pub mod tool;
pub mod validation;

pub use context::{AgentRunner, DelegationChain, NoRunner, ToolContext};
pub use input::ToolInput;
pub use registry::ToolRegistry;
pub use state::SessionState;
pub use tool::{FnTool, Tool};
