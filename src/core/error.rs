//! Custom error types for Scribe
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Scribe operations
#[derive(Error, Debug)]
pub enum ScribeError {
    /// A tool name was requested that the registry does not know
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A tool with this name is already registered
    #[error("Tool '{0}' is already registered")]
    DuplicateToolName(String),

    /// Tool arguments did not match the tool's schema
    #[error("Invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// An agent (or a tool it references) could not be resolved
    #[error("Unknown agent '{agent}': {reason}")]
    UnknownAgent { agent: String, reason: String },

    /// The background job was started a second time
    #[error("Background job '{0}' was already started")]
    AlreadyStarted(String),

    /// The background job finished with a failure
    #[error("Background job failed: {0}")]
    JobFailed(String),

    /// Reasoning backend request failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// Reasoning backend refused the request; repeating it will not help
    #[error("Backend rejected request: {0}")]
    BackendRejected(String),

    /// A tool body reported a failure
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// An agent was asked to delegate to itself, directly or transitively
    #[error("Delegation cycle: {0}")]
    DelegationCycle(String),

    /// An agent used up its turn budget without producing a final message
    #[error("Agent '{agent}' exceeded {max_turns} turns without a final answer")]
    TurnLimitExceeded { agent: String, max_turns: usize },

    /// A write-once session slot was written twice
    #[error("Session slot '{0}' is already set")]
    SlotAlreadySet(&'static str),

    /// The input artifact cannot be processed
    #[error("Invalid input artifact: {0}")]
    InvalidArtifact(String),

    /// External transcription failed
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

impl ScribeError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid-arguments error
    pub fn invalid_arguments(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case tag, used in structured tool error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "unknown_tool",
            Self::DuplicateToolName(_) => "duplicate_tool_name",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::UnknownAgent { .. } => "unknown_agent",
            Self::AlreadyStarted(_) => "already_started",
            Self::JobFailed(_) => "job_failed",
            Self::Backend(_) | Self::BackendRejected(_) | Self::Http(_) => "backend_error",
            Self::ToolExecution(_) => "tool_execution_error",
            Self::DelegationCycle(_) => "delegation_cycle",
            Self::TurnLimitExceeded { .. } => "turn_limit_exceeded",
            Self::SlotAlreadySet(_) => "slot_already_set",
            Self::InvalidArtifact(_) => "invalid_artifact",
            Self::Transcription(_) => "transcription_error",
            Self::Config(_) => "config_error",
            Self::Json(_) => "json_error",
            Self::Io(_) => "io_error",
            Self::Other(_) => "error",
        }
    }

    /// Whether a backend request that failed with this error is worth repeating
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend(_) => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Render the error as the payload handed back to the reasoning backend
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        })
    }
}

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
