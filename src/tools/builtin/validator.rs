//! Quality assurance tools
//!
//! Structural checks on the final JSON deliverable. The input may be raw
//! JSON, JSON inside Markdown fences, or JSON surrounded by prose.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::core::Result;
use crate::tools::context::ToolContext;
use crate::tools::input::ToolInput;
use crate::tools::tool::{parse_args, Tool};
use crate::tools::ToolRegistry;

/// Segments checked per payload
const MAX_SEGMENTS_CHECKED: usize = 50;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("code fence regex must compile")
});

fn strip_code_fences(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// Slice from the first opening bracket to the last closing one
fn extract_json_candidate(text: &str) -> &str {
    let cleaned = strip_code_fences(text);

    let first = [cleaned.find('{'), cleaned.find('[')]
        .into_iter()
        .flatten()
        .min();
    let Some(first) = first else {
        return cleaned;
    };

    let last = [cleaned.rfind('}'), cleaned.rfind(']')]
        .into_iter()
        .flatten()
        .max();
    match last {
        None => &cleaned[first..],
        Some(last) if last <= first => cleaned,
        Some(last) => &cleaned[first..=last],
    }
}

fn validate_segments(segments: &[Value]) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, segment) in segments.iter().take(MAX_SEGMENTS_CHECKED).enumerate() {
        let Some(segment) = segment.as_object() else {
            errors.push(format!("segments[{}] must be an object", index));
            break;
        };

        for key in ["text", "speaker"] {
            if segment.get(key).is_some_and(|v| !v.is_string()) {
                errors.push(format!("segments[{}].{} must be a string", index, key));
            }
        }
        for key in ["start", "end"] {
            if segment.get(key).is_some_and(|v| !v.is_number()) {
                errors.push(format!("segments[{}].{} must be a number", index, key));
            }
        }

        let start = segment.get("start").and_then(Value::as_f64);
        let end = segment.get("end").and_then(Value::as_f64);
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.push(format!("segments[{}] has end before start", index));
            }
        }
    }

    errors
}

/// Check a transcription payload and describe the result
pub fn validate_json_structure(transcription: &str) -> String {
    let text = match ToolInput::parse(transcription) {
        ToolInput::Empty => return "Invalid JSON: empty input".to_string(),
        ToolInput::Structured(payload) => return check_payload(&payload),
        ToolInput::PlainText(text) => text,
    };

    let candidate = extract_json_candidate(&text);
    if candidate.is_empty() {
        return "Invalid JSON: empty input".to_string();
    }

    let payload: Value = match serde_json::from_str(candidate) {
        Ok(payload) => payload,
        Err(e) => {
            let message = e.to_string();
            let reason = message.split(" at line ").next().unwrap_or(&message);
            return format!(
                "Invalid JSON: {} (line {}, col {})",
                reason,
                e.line(),
                e.column()
            );
        }
    };

    match payload.as_object() {
        Some(payload) => check_payload(payload),
        None => "Invalid JSON: top-level must be an object".to_string(),
    }
}

fn check_payload(payload: &Map<String, Value>) -> String {
    let mut errors = Vec::new();

    if !payload.contains_key("transcription") {
        errors.push("missing required field: transcription".to_string());
    }
    if !payload.contains_key("summary") {
        errors.push("missing required field: summary".to_string());
    }
    if payload.get("transcription").is_some_and(|v| !v.is_string()) {
        errors.push("transcription must be a string".to_string());
    }
    if payload.get("text").is_some_and(|v| !v.is_string()) {
        errors.push("text must be a string".to_string());
    }

    match payload.get("summary") {
        Some(Value::Array(items)) if !items.iter().all(Value::is_string) => {
            errors.push("summary list must contain only strings".to_string());
        }
        Some(Value::Array(_)) | Some(Value::String(_)) | None => {}
        Some(_) => errors.push("summary must be a string or list of strings".to_string()),
    }

    match payload.get("segments") {
        Some(Value::Array(segments)) => errors.extend(validate_segments(segments)),
        Some(_) => errors.push("segments must be a list".to_string()),
        None => {}
    }

    if errors.is_empty() {
        "JSON structure is valid".to_string()
    } else {
        format!("Invalid JSON structure: {}", errors.join("; "))
    }
}

#[derive(Deserialize)]
struct ValidateArgs {
    transcription: String,
}

/// Validates the structure of the final JSON deliverable
pub struct ValidateJsonStructure {
    parameters: Value,
}

impl ValidateJsonStructure {
    pub fn new() -> Self {
        Self {
            parameters: json!({
                "type": "object",
                "properties": {
                    "transcription": {
                        "type": "string",
                        "description": "JSON payload to check, optionally wrapped in Markdown fences"
                    }
                },
                "required": ["transcription"]
            }),
        }
    }
}

impl Default for ValidateJsonStructure {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ValidateJsonStructure {
    fn name(&self) -> &str {
        "validate_json_structure"
    }

    fn description(&self) -> &str {
        "Validate the transcription payload and return a human-readable QA status."
    }

    fn parameters(&self) -> &Value {
        &self.parameters
    }

    async fn invoke(&self, args: Value, _ctx: &ToolContext<'_>) -> Result<Value> {
        let args: ValidateArgs = parse_args(self.name(), args)?;
        let verdict = validate_json_structure(&args.transcription);
        tracing::debug!(verdict = %verdict, "Validated JSON structure");
        Ok(Value::String(verdict))
    }
}

/// Register the quality assurance tools
pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(ValidateJsonStructure::new())
}
