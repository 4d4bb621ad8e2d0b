//! Agent loop state management
//!
//! Tracks where one agent's turn loop is and how many backend requests it
//! has spent.

use std::fmt;

/// Phase of the turn loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePhase {
    /// Waiting for the backend to answer
    AwaitingBackend,
    /// Running the named tool
    ExecutingTool(String),
    /// A final message was produced
    Complete,
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingBackend => write!(f, "awaiting_backend"),
            Self::ExecutingTool(name) => write!(f, "executing_tool({})", name),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// State of the agent turn loop
#[derive(Debug, Clone)]
pub struct LoopState {
    /// Backend requests made so far
    pub turn: usize,
    /// Maximum allowed requests
    pub max_turns: usize,
    /// Tool calls executed so far
    pub tool_calls: usize,
    /// Current phase
    pub phase: EnginePhase,
}

impl LoopState {
    /// Create a new loop state with the given max turns
    pub fn new(max_turns: usize) -> Self {
        Self {
            turn: 0,
            max_turns,
            tool_calls: 0,
            phase: EnginePhase::AwaitingBackend,
        }
    }

    /// Check if the loop should continue
    pub fn should_continue(&self) -> bool {
        self.turn < self.max_turns && self.phase != EnginePhase::Complete
    }

    /// Start the next backend request
    pub fn next_turn(&mut self) {
        self.turn += 1;
        self.phase = EnginePhase::AwaitingBackend;
    }

    /// Enter tool execution
    pub fn executing(&mut self, tool: &str) {
        self.tool_calls += 1;
        self.phase = EnginePhase::ExecutingTool(tool.to_string());
    }

    /// Mark the loop finished
    pub fn complete(&mut self) {
        self.phase = EnginePhase::Complete;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_state_new() {
        let state = LoopState::new(10);
        assert_eq!(state.turn, 0);
        assert_eq!(state.max_turns, 10);
        assert_eq!(state.phase, EnginePhase::AwaitingBackend);
    }

    #[test]
    fn test_should_continue() {
        let mut state = LoopState::new(2);
        assert!(state.should_continue());

        state.next_turn();
        state.executing("get_transcript");
        assert_eq!(state.phase.to_string(), "executing_tool(get_transcript)");
        assert!(state.should_continue());

        state.next_turn();
        assert!(!state.should_continue()); // Reached max turns
    }

    #[test]
    fn test_complete_stops_loop() {
        let mut state = LoopState::new(5);
        state.next_turn();
        state.complete();
        assert!(!state.should_continue());
    }
}
