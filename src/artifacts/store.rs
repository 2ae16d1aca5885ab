use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::reference::ArtifactRef;
use crate::error::StoreResult;

/// A tracked job execution. Parameters and artifact traffic are recorded
/// against its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub job_type: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Finished,
    Failed,
}

/// A new artifact waiting to be logged
#[derive(Debug, Clone)]
pub struct ArtifactSubmission {
    pub name: String,
    pub artifact_type: String,
    pub description: String,
    pub file: Option<PathBuf>,
}

impl ArtifactSubmission {
    pub fn new(
        name: impl Into<String>,
        artifact_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            artifact_type: artifact_type.into(),
            description: description.into(),
            file: None,
        }
    }

    /// Attach the artifact's file. Artifacts hold exactly one file; a second
    /// call replaces the first.
    pub fn add_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }
}

/// Result of logging an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedArtifact {
    pub name: String,
    pub version: u32,
    pub artifact_type: String,
    pub digest: String,
    pub size_bytes: u64,
    /// True when the content matched the newest version and no new version was created
    pub deduplicated: bool,
}

impl LoggedArtifact {
    pub fn reference(&self) -> String {
        format!("{}:v{}", self.name, self.version)
    }
}

/// The tracking service the cleaner talks to.
pub trait ArtifactStore {
    fn start_run(&self, job_type: &str) -> StoreResult<Run>;

    /// Merge `config` (a JSON object) into the run's recorded parameters.
    fn log_config(&self, run: &Run, config: &serde_json::Value) -> StoreResult<()>;

    /// Resolve a reference to a local copy of its file. `Ok(None)` means the
    /// artifact is registered but its file cannot be produced.
    fn use_artifact(&self, run: &Run, reference: &ArtifactRef) -> StoreResult<Option<PathBuf>>;

    fn log_artifact(&self, run: &Run, submission: ArtifactSubmission) -> StoreResult<LoggedArtifact>;

    fn finish_run(&self, run: &Run, status: RunStatus) -> StoreResult<()>;
}
