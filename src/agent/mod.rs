//! Agent module - orchestration and conversation management
//!
//! Agent definitions, the turn-loop engine, agent-as-tool delegation, and the
//! orchestrator that ties a run together.

pub mod conversation;
pub mod definition;
pub mod delegation;
pub mod engine;
pub mod loop_state;
pub mod orchestrator;

pub use conversation::ConversationHistory;
pub use definition::AgentDefinition;
pub use delegation::AgentTool;
pub use engine::{ConversationEngine, RunOutcome};
pub use loop_state::{EnginePhase, LoopState};
pub use orchestrator::Orchestrator;
