//! Artifact tracking: references, the store seam, and the local
//! content-addressed implementation.

pub mod cas_fs;
pub mod local;
pub mod meta;
pub mod reference;
pub mod run_log;
pub mod store;

pub use local::LocalArtifactStore;
pub use reference::{ArtifactRef, VersionSelector};
pub use store::{ArtifactStore, ArtifactSubmission, LoggedArtifact, Run, RunStatus};
