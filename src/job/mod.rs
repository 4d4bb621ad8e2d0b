//! Background jobs
//!
//! The once-per-run transcription job and the handle tools use to wait on it.

pub mod handle;
pub mod transcription;

pub use handle::{BackgroundJobHandle, JobState};
pub use transcription::{validate_audio_path, CommandTranscriber, Transcriber};
