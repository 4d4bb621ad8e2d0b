//! Transcription launcher
//!
//! Speech-to-text runs in an external program; Scribe only launches it once
//! in the background and hands its stdout to whoever asks for the transcript.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::config::TranscriptionConfig;
use crate::core::{Result, ScribeError};

/// Turns an audio file into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the file at `audio`
    async fn transcribe(&self, audio: &Path) -> Result<String>;
}

/// Transcriber backed by an external command
#[derive(Debug, Clone)]
pub struct CommandTranscriber {
    command: String,
    args: Vec<String>,
}

impl CommandTranscriber {
    /// Create a transcriber running `command` with `args`
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &TranscriptionConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    fn render_args(&self, audio: &Path) -> Vec<String> {
        let input = audio.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{input}", &input))
            .collect()
    }
}

#[async_trait]
impl Transcriber for CommandTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String> {
        if !audio.exists() {
            return Err(ScribeError::Transcription(format!(
                "File not found at {}",
                audio.display()
            )));
        }

        let mut cmd = Command::new(&self.command);
        cmd.args(self.render_args(audio));
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::info!(command = %self.command, audio = %audio.display(), "Starting transcription");

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScribeError::Transcription(format!(
                    "transcription command '{}' not found",
                    self.command
                ))
            } else {
                ScribeError::Transcription(format!("Failed to run {}: {}", self.command, e))
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ScribeError::Transcription(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )))
        }
    }
}

/// Check that `path` is an existing file with an accepted audio extension
pub fn validate_audio_path(path: &Path, allowed_extensions: &[String]) -> Result<()> {
    if !path.exists() {
        return Err(ScribeError::InvalidArtifact(format!(
            "Path '{}' does not exist",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(ScribeError::InvalidArtifact(format!(
            "Path '{}' is not a file",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if !allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&extension)) {
        return Err(ScribeError::InvalidArtifact(format!(
            "Unsupported audio format '.{}'",
            extension
        )));
    }

    Ok(())
}
