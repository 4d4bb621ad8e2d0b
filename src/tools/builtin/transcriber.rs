//! Transcriber tools

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::Result;
use crate::tools::context::ToolContext;
use crate::tools::tool::{parse_args, Tool};
use crate::tools::ToolRegistry;

#[derive(Deserialize)]
struct LoadArgs {
    file_path: String,
}

/// Placeholder audio loader
pub struct LoadAudioFile {
    parameters: Value,
}

impl LoadAudioFile {
    pub fn new() -> Self {
        Self {
            parameters: json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path of the audio file to load"
                    }
                },
                "required": ["file_path"]
            }),
        }
    }
}

impl Default for LoadAudioFile {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for LoadAudioFile {
    fn name(&self) -> &str {
        "load_audio_file"
    }

    fn description(&self) -> &str {
        "Load an audio file from the given file path."
    }

    fn parameters(&self) -> &Value {
        &self.parameters
    }

    async fn invoke(&self, args: Value, _ctx: &ToolContext<'_>) -> Result<Value> {
        let args: LoadArgs = parse_args(self.name(), args)?;
        tracing::info!(path = %args.file_path, "Loading audio file");

        let message = if Path::new(&args.file_path).exists() {
            format!("Loaded audio file at {}", args.file_path)
        } else {
            format!("Error: File not found at {}", args.file_path)
        };
        Ok(Value::String(message))
    }
}

/// Register the transcriber tools
pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(LoadAudioFile::new())
}
