//! The basic cleaning step.
//!
//! Fetch the input artifact, apply the four stages in order (price range,
//! NYC bounds, `last_review` parsing, key completeness), write the CSV and
//! log it as a new artifact.

pub mod dates;
pub mod stages;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::artifacts::{ArtifactRef, ArtifactStore, ArtifactSubmission, LoggedArtifact, Run, RunStatus};
use crate::constants::JOB_TYPE;
use crate::dataset::{load_csv, write_csv_file, Dataset};
use crate::error::{CleanError, Result, StoreError};
use crate::metrics::CleanerMetrics;

/// Everything the job is invoked with. Logged verbatim as the run config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanArgs {
    pub input_artifact: String,
    pub output_artifact: String,
    pub output_type: String,
    pub output_description: String,
    pub min_price: f64,
    pub max_price: f64,
}

impl CleanArgs {
    pub fn params(&self) -> CleaningParams {
        CleaningParams {
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleaningParams {
    pub min_price: f64,
    pub max_price: f64,
}

/// Row counts through the stages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageCounts {
    pub rows_in: usize,
    pub after_price: usize,
    /// `None` when a coordinate column is absent and the geo stage was skipped
    pub after_geo: Option<usize>,
    /// `None` when there is no `last_review` column
    pub dates_coerced: Option<usize>,
    pub rows_out: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleaningReport {
    pub counts: StageCounts,
    pub output_path: PathBuf,
    pub artifact: LoggedArtifact,
}

/// Apply the cleaning stages to a dataset in place.
pub fn clean(dataset: &mut Dataset, params: &CleaningParams) -> StageCounts {
    if params.min_price > params.max_price {
        warn!(
            "min_price {} is greater than max_price {}; every row will be dropped",
            params.min_price, params.max_price
        );
    }

    let rows_in = dataset.len();
    stages::filter_price(dataset, params.min_price, params.max_price);
    let after_price = dataset.len();

    let after_geo = stages::filter_geo(dataset).map(|_| dataset.len());
    let dates_coerced = stages::normalize_last_review(dataset);
    stages::drop_incomplete(dataset);

    StageCounts {
        rows_in,
        after_price,
        after_geo,
        dates_coerced,
        rows_out: dataset.len(),
    }
}

/// Runs the cleaning job against an artifact store
pub struct Cleaner {
    store: Arc<dyn ArtifactStore>,
    output_path: PathBuf,
}

impl std::fmt::Debug for Cleaner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cleaner")
            .field("store", &"<Arc<dyn ArtifactStore>>")
            .field("output_path", &self.output_path)
            .finish()
    }
}

impl Cleaner {
    pub fn new(store: Arc<dyn ArtifactStore>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            output_path: output_path.into(),
        }
    }

    /// Execute one run. The run is closed as failed if any step errors.
    pub fn run(&self, args: &CleanArgs) -> Result<CleaningReport> {
        let run = self.store.start_run(JOB_TYPE)?;
        let result = self.run_inner(&run, args);
        let status = if result.is_ok() { RunStatus::Finished } else { RunStatus::Failed };
        if let Err(e) = self.store.finish_run(&run, status) {
            warn!("Failed to close run {}: {}", run.id, e);
        }
        result
    }

    #[instrument(skip(self, run, args), fields(run_id = %run.id))]
    fn run_inner(&self, run: &Run, args: &CleanArgs) -> Result<CleaningReport> {
        let config = serde_json::to_value(args).map_err(StoreError::from)?;
        self.store.log_config(run, &config)?;

        info!("Fetching input artifact: {}", args.input_artifact);
        let reference = ArtifactRef::parse(&args.input_artifact)?;
        let local_path = match self.store.use_artifact(run, &reference)? {
            Some(path) if path.exists() => path,
            other => {
                return Err(CleanError::MissingInputFile {
                    reference: args.input_artifact.clone(),
                    path: other,
                })
            }
        };

        info!("Reading CSV: {}", local_path.display());
        let mut dataset = load_csv(&local_path)?;
        CleanerMetrics::record_rows_loaded(dataset.len());

        let counts = clean(&mut dataset, &args.params());

        info!(
            "Writing cleaned CSV: {} (shape=({}, {}))",
            self.output_path.display(),
            dataset.len(),
            dataset.columns().len()
        );
        write_csv_file(&dataset, &self.output_path)?;
        CleanerMetrics::record_rows_written(dataset.len());
        drop(dataset);

        info!("Uploading cleaned artifact");
        let submission = ArtifactSubmission::new(
            args.output_artifact.clone(),
            args.output_type.clone(),
            args.output_description.clone(),
        )
        .add_file(&self.output_path);
        let artifact = self.store.log_artifact(run, submission)?;

        Ok(CleaningReport {
            counts,
            output_path: self.output_path.clone(),
            artifact,
        })
    }
}
