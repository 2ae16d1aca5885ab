use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use basic_cleaning::artifacts::{ArtifactStore, ArtifactSubmission, LocalArtifactStore, RunStatus};
use basic_cleaning::config::Config;
use basic_cleaning::logging;

/// Upload a local file to the artifact store as a new artifact version
#[derive(Parser, Debug)]
#[command(name = "log-artifact")]
struct Args {
    /// File to upload
    #[arg(long)]
    file: PathBuf,

    /// Artifact name, e.g. 'sample.csv'
    #[arg(long)]
    name: String,

    /// Artifact type, e.g. 'raw_data'
    #[arg(long = "type")]
    artifact_type: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Configuration file (defaults to ./basic_cleaning.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let config = Config::load(args.config.as_deref())?;
    let _guard = logging::init_logging(&config.logging);

    if !args.file.exists() {
        anyhow::bail!("File not found: {}", args.file.display());
    }

    let store = LocalArtifactStore::open(&config.store.root)
        .with_context(|| format!("opening artifact store at {}", config.store.root.display()))?;
    let run = store.start_run("log_artifact")?;
    store.log_config(
        &run,
        &serde_json::json!({
            "file": args.file.display().to_string(),
            "name": args.name,
            "type": args.artifact_type,
        }),
    )?;

    let submission = ArtifactSubmission::new(&args.name, &args.artifact_type, &args.description)
        .add_file(&args.file);
    let logged = match store.log_artifact(&run, submission) {
        Ok(logged) => logged,
        Err(e) => {
            store.finish_run(&run, RunStatus::Failed)?;
            return Err(e.into());
        }
    };
    store.finish_run(&run, RunStatus::Finished)?;

    info!("Logged {} ({} bytes)", logged.reference(), logged.size_bytes);
    println!("{}", logged.reference());
    Ok(())
}
