pub mod artifacts;
pub mod cleaner;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod metrics;

pub use cleaner::{clean, CleanArgs, Cleaner, CleaningParams, CleaningReport, StageCounts};
pub use error::{CleanError, Result, StoreError};
