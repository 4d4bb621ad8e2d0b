//! LLM module - reasoning backend integrations
//!
//! Provides the backend abstraction, the OpenAI Responses client, the retry
//! policy wrapped around every request, and (with the `testing` feature) a
//! scripted oracle.

pub mod openai;
pub mod retry;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;
pub mod traits;

pub use openai::OpenAiBackend;
pub use retry::RetryPolicy;
#[cfg(any(test, feature = "testing"))]
pub use scripted::{RecordedRequest, ScriptedBackend};
pub use traits::{BackendRequest, BackendResponse, ReasoningBackend, TokenUsage};
