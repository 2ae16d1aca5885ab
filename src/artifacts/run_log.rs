use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::store::RunStatus;
use crate::error::StoreResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started { job_type: String },
    Config { config: serde_json::Value },
    UsedArtifact { reference: String, version: u32, path: Option<String> },
    LoggedArtifact { name: String, version: u32, digest: String, deduplicated: bool },
    Finished { status: RunStatus },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogLine {
    pub run_id: Uuid,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: RunEvent,
}

/// `<root>/runs/<run_id>.ndjson`
pub fn run_log_path(root: &Path, run_id: &Uuid) -> PathBuf {
    root.join("runs").join(format!("{}.ndjson", run_id))
}

/// Append one event line to the run's log
pub fn append(root: &Path, run_id: &Uuid, event: RunEvent) -> StoreResult<()> {
    let path = run_log_path(root, run_id);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    let line = serde_json::to_string(&RunLogLine { run_id: *run_id, at: Utc::now(), event })?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// Read back every event logged for a run, in order
pub fn read_events(root: &Path, run_id: &Uuid) -> StoreResult<Vec<RunEvent>> {
    let file = fs::File::open(run_log_path(root, run_id))?;
    let mut events = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: RunLogLine = serde_json::from_str(&line)?;
        events.push(parsed.event);
    }
    Ok(events)
}
