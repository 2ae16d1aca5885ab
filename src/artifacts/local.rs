use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cas_fs::{cas_path, write_cas};
use super::meta::{ArtifactIndex, ArtifactRecord};
use super::reference::{ArtifactRef, VersionSelector};
use super::run_log::{self, RunEvent};
use super::store::{ArtifactStore, ArtifactSubmission, LoggedArtifact, Run, RunStatus};
use crate::error::{StoreError, StoreResult};
use crate::metrics::CleanerMetrics;

/// Artifact store backed by a local directory.
///
/// Layout under `root`:
/// - `sha256/<aa>/<bb>/<hex>` content-addressed blobs
/// - `meta.db` artifact versions and runs
/// - `runs/<run_id>.ndjson` per-run event log
/// - `downloads/<name>/v<N>/<file>` materialized inputs
pub struct LocalArtifactStore {
    root: PathBuf,
    index: ArtifactIndex,
}

impl std::fmt::Debug for LocalArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalArtifactStore")
            .field("root", &self.root)
            .field("index", &"<ArtifactIndex>")
            .finish()
    }
}

impl LocalArtifactStore {
    pub fn open<P: Into<PathBuf>>(root: P) -> StoreResult<Self> {
        let root = root.into();
        let index = ArtifactIndex::open_at_root(&root)?;
        Ok(Self { root, index })
    }

    pub fn index(&self) -> &ArtifactIndex {
        &self.index
    }

    /// Index record the reference points at, if any
    pub fn resolve(&self, reference: &ArtifactRef) -> StoreResult<Option<ArtifactRecord>> {
        match reference.version {
            VersionSelector::Latest => self.index.latest(&reference.name),
            VersionSelector::Number(n) => self.index.get_version(&reference.name, n),
        }
    }

    /// Blob path of a registered version
    pub fn blob_path(&self, record: &ArtifactRecord) -> PathBuf {
        cas_path(&self.root, &record.digest)
    }

    fn download_path(&self, record: &ArtifactRecord) -> PathBuf {
        self.root
            .join("downloads")
            .join(&record.name)
            .join(format!("v{}", record.version))
            .join(&record.file_name)
    }
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.trim().is_empty() || name == "." || name == ".." || name.contains(['/', '\\', ':']) {
        return Err(StoreError::InvalidReference(name.to_string()));
    }
    Ok(())
}

fn merge_config(target: &mut serde_json::Value, update: &serde_json::Value) {
    match (target.as_object_mut(), update.as_object()) {
        (Some(t), Some(u)) => {
            for (k, v) in u {
                t.insert(k.clone(), v.clone());
            }
        }
        _ => *target = update.clone(),
    }
}

impl ArtifactStore for LocalArtifactStore {
    fn start_run(&self, job_type: &str) -> StoreResult<Run> {
        let run = Run {
            id: Uuid::new_v4(),
            job_type: job_type.to_string(),
            started_at: Utc::now(),
        };
        self.index.insert_run(&run.id, job_type, &run.started_at)?;
        run_log::append(&self.root, &run.id, RunEvent::Started { job_type: job_type.to_string() })?;
        info!(run_id = %run.id, "Started {} run", job_type);
        Ok(run)
    }

    fn log_config(&self, run: &Run, config: &serde_json::Value) -> StoreResult<()> {
        let mut current = self
            .index
            .run_config(&run.id)?
            .unwrap_or_else(|| serde_json::json!({}));
        merge_config(&mut current, config);
        self.index.set_run_config(&run.id, &current)?;
        run_log::append(&self.root, &run.id, RunEvent::Config { config: config.clone() })?;
        debug!(run_id = %run.id, config = %config, "Logged run config");
        Ok(())
    }

    fn use_artifact(&self, run: &Run, reference: &ArtifactRef) -> StoreResult<Option<PathBuf>> {
        let record = self
            .resolve(reference)?
            .ok_or_else(|| StoreError::ArtifactNotFound(reference.to_string()))?;

        let blob = self.blob_path(&record);
        let local = if blob.exists() {
            let dest = self.download_path(&record);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&blob, &dest)?;
            Some(dest)
        } else {
            warn!(
                "Artifact {}:v{} is registered but blob {} is missing",
                record.name, record.version, record.digest
            );
            None
        };

        run_log::append(
            &self.root,
            &run.id,
            RunEvent::UsedArtifact {
                reference: reference.to_string(),
                version: record.version,
                path: local.as_ref().map(|p| p.display().to_string()),
            },
        )?;
        Ok(local)
    }

    fn log_artifact(&self, run: &Run, submission: ArtifactSubmission) -> StoreResult<LoggedArtifact> {
        validate_name(&submission.name)?;
        let file = submission
            .file
            .as_ref()
            .ok_or_else(|| StoreError::EmptyArtifact(submission.name.clone()))?;
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::EmptyArtifact(submission.name.clone()))?
            .to_string();

        let bytes = fs::read(file)?;
        let digest = write_cas(&self.root, &bytes)?;
        let latest = self.index.latest(&submission.name)?;

        // An unchanged upload reports the stored version's metadata
        let (version, deduplicated, artifact_type) = match latest {
            Some(prev) if prev.digest == digest => (prev.version, true, prev.artifact_type),
            Some(prev) => (prev.version + 1, false, submission.artifact_type.clone()),
            None => (0, false, submission.artifact_type.clone()),
        };

        if !deduplicated {
            self.index.insert_artifact(&ArtifactRecord {
                name: submission.name.clone(),
                version,
                artifact_type: artifact_type.clone(),
                description: submission.description.clone(),
                file_name,
                digest: digest.clone(),
                size_bytes: bytes.len() as u64,
                run_id: run.id.to_string(),
                created_at: Utc::now().to_rfc3339(),
            })?;
            CleanerMetrics::record_artifact_logged();
        }

        run_log::append(
            &self.root,
            &run.id,
            RunEvent::LoggedArtifact {
                name: submission.name.clone(),
                version,
                digest: digest.clone(),
                deduplicated,
            },
        )?;
        info!(
            run_id = %run.id,
            "Logged artifact {}:v{}{}",
            submission.name,
            version,
            if deduplicated { " (unchanged)" } else { "" }
        );

        Ok(LoggedArtifact {
            name: submission.name,
            version,
            artifact_type,
            digest,
            size_bytes: bytes.len() as u64,
            deduplicated,
        })
    }

    fn finish_run(&self, run: &Run, status: RunStatus) -> StoreResult<()> {
        let label = match status {
            RunStatus::Finished => "finished",
            RunStatus::Failed => "failed",
        };
        self.index.finish_run(&run.id, label, &Utc::now())?;
        run_log::append(&self.root, &run.id, RunEvent::Finished { status })?;
        info!(run_id = %run.id, "Run {}", label);
        Ok(())
    }
}
