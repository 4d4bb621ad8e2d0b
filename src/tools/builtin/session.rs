//! Session tools: the input artifact and the background transcript

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::{Result, ScribeError};
use crate::tools::context::ToolContext;
use crate::tools::state::SessionState;
use crate::tools::tool::{no_parameters, Tool};
use crate::tools::ToolRegistry;

/// Returns the path of the audio file being processed
pub struct GetArtifactPath {
    session: Arc<SessionState>,
    parameters: Value,
}

/// Waits for the background transcription and returns its text
pub struct GetTranscript {
    session: Arc<SessionState>,
    parameters: Value,
}

impl GetArtifactPath {
    pub fn new(session: Arc<SessionState>) -> Self {
        Self {
            session,
            parameters: no_parameters(),
        }
    }
}

impl GetTranscript {
    pub fn new(session: Arc<SessionState>) -> Self {
        Self {
            session,
            parameters: no_parameters(),
        }
    }
}

#[async_trait]
impl Tool for GetArtifactPath {
    fn name(&self) -> &str {
        "get_artifact_path"
    }

    fn description(&self) -> &str {
        "Get the path of the audio file being processed."
    }

    fn parameters(&self) -> &Value {
        &self.parameters
    }

    async fn invoke(&self, _args: Value, _ctx: &ToolContext<'_>) -> Result<Value> {
        self.session
            .artifact()
            .map(|path| Value::String(path.display().to_string()))
            .ok_or_else(|| ScribeError::tool("no input artifact has been registered"))
    }
}

#[async_trait]
impl Tool for GetTranscript {
    fn name(&self) -> &str {
        "get_transcript"
    }

    fn description(&self) -> &str {
        "Retrieve the transcript of the audio file. Waits until transcription is complete."
    }

    fn parameters(&self) -> &Value {
        &self.parameters
    }

    async fn invoke(&self, _args: Value, _ctx: &ToolContext<'_>) -> Result<Value> {
        let job = self
            .session
            .job()
            .ok_or_else(|| ScribeError::tool("no transcription job has been started"))?;

        let transcript = job.await_result().await?;
        Ok(Value::String(transcript.to_string()))
    }
}

/// Register the session tools
pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    let session = Arc::clone(registry.session());
    registry.register(GetArtifactPath::new(Arc::clone(&session)))?;
    registry.register(GetTranscript::new(session))
}
