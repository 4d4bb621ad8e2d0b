//! Session state held by the registry
//!
//! Two write-once slots: the input artifact path and the background job.
//! Both are filled before the root agent starts.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::core::{Result, ScribeError};
use crate::job::BackgroundJobHandle;

/// Per-run slots shared by every tool
#[derive(Debug, Default)]
pub struct SessionState {
    artifact: OnceLock<PathBuf>,
    job: OnceLock<BackgroundJobHandle>,
}

impl SessionState {
    /// Create empty slots
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the input artifact path
    pub fn set_artifact(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.artifact
            .set(path.into())
            .map_err(|_| ScribeError::SlotAlreadySet("artifact_path"))
    }

    /// Input artifact path, if set
    pub fn artifact(&self) -> Option<&Path> {
        self.artifact.get().map(PathBuf::as_path)
    }

    /// Record the background job
    pub fn set_job(&self, job: BackgroundJobHandle) -> Result<()> {
        self.job
            .set(job)
            .map_err(|_| ScribeError::SlotAlreadySet("background_job"))
    }

    /// Background job, if set
    pub fn job(&self) -> Option<&BackgroundJobHandle> {
        self.job.get()
    }
}
