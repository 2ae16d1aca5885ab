//! Cleaning job metrics
//!
//! Counters are emitted through the `metrics` facade. The job is short-lived
//! and installs no exporter; an embedding process that installs a recorder
//! picks them up.

pub struct CleanerMetrics;

impl CleanerMetrics {
    /// Record rows read from the input artifact
    pub fn record_rows_loaded(rows: usize) {
        ::metrics::counter!("basic_cleaning_rows_loaded_total").increment(rows as u64);
    }

    /// Record rows removed by one cleaning stage
    pub fn record_rows_dropped(stage: &'static str, rows: usize) {
        ::metrics::counter!("basic_cleaning_rows_dropped_total", "stage" => stage)
            .increment(rows as u64);
    }

    /// Record rows written to the output file
    pub fn record_rows_written(rows: usize) {
        ::metrics::counter!("basic_cleaning_rows_written_total").increment(rows as u64);
    }

    pub fn record_artifact_logged() {
        ::metrics::counter!("basic_cleaning_artifacts_logged_total").increment(1);
    }
}
