//! Cleaner tools
//!
//! Filler-word removal is delegated to the reasoning backend. The tool only
//! validates the payload, builds the request, and falls back to the input
//! text when the backend gives nothing usable.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::core::{HistoryEntry, OutputItem, Result};
use crate::llm::{BackendRequest, ReasoningBackend};
use crate::tools::context::ToolContext;
use crate::tools::input::ToolInput;
use crate::tools::tool::{parse_args, Tool};
use crate::tools::ToolRegistry;

/// Returned when the input is not a JSON object
pub const JSON_REQUIRED: &str = "[cleaner_error] JSON payload required. Use {'transcript': '...'}.";

/// Returned when the JSON object has no transcript
pub const TRANSCRIPT_REQUIRED: &str = "[cleaner_error] JSON payload must include 'transcript'.";

const CLEANER_PROMPT: &str = "You clean transcripts. Remove filler words and hesitation noise \
while preserving meaning, tone, proper nouns, and technical terms. Keep speaker labels and \
[inaudible]/[unclear] markers.";

#[derive(Deserialize)]
struct CleanArgs {
    text: String,
}

/// Removes filler words from a transcript payload
pub struct RemoveFillerWords {
    backend: Arc<dyn ReasoningBackend>,
    model: String,
    parameters: Value,
}

impl RemoveFillerWords {
    pub fn new(backend: Arc<dyn ReasoningBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "JSON payload: {\"transcript\": \"...\", \"metadata\": {...}}"
                    }
                },
                "required": ["text"]
            }),
        }
    }

    /// Ask the backend for a cleaned transcript; on failure return the input and a warning
    async fn clean(&self, transcript: &str) -> (String, Option<String>) {
        let history = [
            HistoryEntry::system(CLEANER_PROMPT),
            HistoryEntry::user(format!(
                "Return only cleaned transcript text, no explanation.\n\n{}",
                transcript
            )),
        ];
        let options = Map::new();
        let request = BackendRequest {
            model: &self.model,
            history: &history,
            tools: &[],
            options: &options,
        };

        let warning = match self.backend.respond(request).await {
            Ok(response) => {
                let cleaned: String = response
                    .items
                    .iter()
                    .filter_map(|item| match item {
                        OutputItem::Message { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                let cleaned = cleaned.trim();

                if !cleaned.is_empty() {
                    return (cleaned.to_string(), None);
                }
                "Backend returned empty output.".to_string()
            }
            Err(e) => format!("Backend cleaner failed ({}).", e),
        };

        tracing::warn!(warning = %warning, "Cleaner fell back to input text");
        (transcript.to_string(), Some(warning))
    }
}

fn base_stats() -> Value {
    json!({
        "strict_fillers_removed": 0,
        "soft_fillers_removed": 0,
        "stutters_collapsed": 0,
        "empty_speaker_lines_dropped": 0,
    })
}

#[async_trait]
impl Tool for RemoveFillerWords {
    fn name(&self) -> &str {
        "remove_filler_words"
    }

    fn description(&self) -> &str {
        "Clean transcript text by removing filler words. Expects a JSON payload string \
         with a 'transcript' field and optional 'metadata' object."
    }

    fn parameters(&self) -> &Value {
        &self.parameters
    }

    async fn invoke(&self, args: Value, _ctx: &ToolContext<'_>) -> Result<Value> {
        let args: CleanArgs = parse_args(self.name(), args)?;

        let payload = match ToolInput::parse(&args.text) {
            ToolInput::Empty => return Ok(Value::String(String::new())),
            ToolInput::PlainText(_) => return Ok(Value::String(JSON_REQUIRED.to_string())),
            ToolInput::Structured(payload) => payload,
        };

        let transcript = match payload.get("transcript") {
            None | Some(Value::Null) => return Ok(Value::String(TRANSCRIPT_REQUIRED.to_string())),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let metadata = payload
            .get("metadata")
            .filter(|m| m.is_object())
            .cloned()
            .unwrap_or_else(|| json!({}));

        let (cleaned_text, warning) = self.clean(&transcript).await;

        Ok(json!({
            "mode": "cleaned",
            "used_backend": true,
            "cleaned_text": cleaned_text,
            "metadata": metadata,
            "stats": base_stats(),
            "warnings": warning.into_iter().collect::<Vec<_>>(),
        }))
    }
}

/// Register the cleaner tools
pub fn register(
    registry: &mut ToolRegistry,
    backend: Arc<dyn ReasoningBackend>,
    model: impl Into<String>,
) -> Result<()> {
    registry.register(RemoveFillerWords::new(backend, model))
}
