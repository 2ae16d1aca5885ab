use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

use basic_cleaning::artifacts::{ArtifactStore, LocalArtifactStore};
use basic_cleaning::config::Config;
use basic_cleaning::{logging, CleanArgs, CleanError, Cleaner};

/// A very basic data cleaning
#[derive(Parser, Debug)]
#[command(name = "basic_cleaning")]
#[command(about = "Download the raw dataset artifact, apply basic cleaning and log the result as a new artifact")]
#[command(version = "0.1.0")]
struct Cli {
    /// Fully-qualified artifact to read, e.g. 'user/proj/sample.csv:latest'
    #[arg(long = "input_artifact")]
    input_artifact: String,

    /// Name for the cleaned CSV artifact to create, e.g. 'clean_sample.csv'
    #[arg(long = "output_artifact")]
    output_artifact: String,

    /// Artifact type for the cleaned dataset, e.g. 'clean_sample'
    #[arg(long = "output_type")]
    output_type: String,

    /// Short description of what the cleaned artifact contains
    #[arg(long = "output_description")]
    output_description: String,

    /// Minimum nightly price to keep (rows below are dropped)
    #[arg(long = "min_price", allow_negative_numbers = true)]
    min_price: f64,

    /// Maximum nightly price to keep (rows above are dropped)
    #[arg(long = "max_price", allow_negative_numbers = true)]
    max_price: f64,

    /// Configuration file (defaults to ./basic_cleaning.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn clean_args(&self) -> CleanArgs {
        CleanArgs {
            input_artifact: self.input_artifact.clone(),
            output_artifact: self.output_artifact.clone(),
            output_type: self.output_type.clone(),
            output_description: self.output_description.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(3);
        }
    };

    let _guard = logging::init_logging(&config.logging);

    if let Err(e) = run(&cli, &config) {
        error!("basic_cleaning failed: {:#}", e);
        eprintln!("❌ {:#}", e);
        let exit_code = exit_code(&e);
        drop(_guard);
        process::exit(exit_code);
    }
}

/// 2 when the input artifact has no local file, 3 for configuration errors.
fn exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<CleanError>() {
        Some(CleanError::MissingInputFile { .. }) => 2,
        Some(CleanError::Config(_)) | Some(CleanError::Toml(_)) => 3,
        _ => 1,
    }
}

fn run(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    info!("Opening artifact store at {}", config.store.root.display());
    let store: Arc<dyn ArtifactStore> = Arc::new(LocalArtifactStore::open(&config.store.root)?);

    let cleaner = Cleaner::new(store, config.output.path());
    let report = cleaner.run(&cli.clean_args())?;

    info!(
        rows_in = report.counts.rows_in,
        rows_out = report.counts.rows_out,
        "Cleaning finished"
    );
    println!("\n📊 Cleaning results:");
    println!("   Rows loaded: {}", report.counts.rows_in);
    println!("   After price filter: {}", report.counts.after_price);
    match report.counts.after_geo {
        Some(n) => println!("   After geo filter: {}", n),
        None => println!("   Geo filter: skipped"),
    }
    if let Some(n) = report.counts.dates_coerced {
        println!("   Unparseable last_review values: {}", n);
    }
    println!("   Rows written: {}", report.counts.rows_out);
    println!("   Output file: {}", report.output_path.display());
    println!("   Artifact: {}", report.artifact.reference());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use basic_cleaning::StoreError;

    const REQUIRED: [&str; 13] = [
        "basic_cleaning",
        "--input_artifact",
        "user/proj/sample.csv:latest",
        "--output_artifact",
        "clean_sample.csv",
        "--output_type",
        "clean_sample",
        "--output_description",
        "Data with outliers and null values removed",
        "--min_price",
        "10",
        "--max_price",
        "350",
    ];

    #[test]
    fn all_underscore_flags_parse() {
        let cli = Cli::try_parse_from(REQUIRED).unwrap();
        let args = cli.clean_args();
        assert_eq!(args.input_artifact, "user/proj/sample.csv:latest");
        assert_eq!(args.output_artifact, "clean_sample.csv");
        assert_eq!(args.output_type, "clean_sample");
        assert_eq!(args.min_price, 10.0);
        assert_eq!(args.max_price, 350.0);
        assert!(cli.config.is_none());
    }

    #[test]
    fn every_flag_except_config_is_required() {
        // Drop one flag/value pair at a time
        for flag in (1..REQUIRED.len()).step_by(2) {
            let argv: Vec<&str> = REQUIRED
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != flag && *i != flag + 1)
                .map(|(_, a)| *a)
                .collect();
            assert!(Cli::try_parse_from(argv).is_err(), "parsed without {}", REQUIRED[flag]);
        }
    }

    #[test]
    fn negative_prices_parse() {
        let mut argv = REQUIRED.to_vec();
        argv[10] = "-5";
        argv[12] = "-1.5";
        let cli = Cli::try_parse_from(argv).unwrap();
        assert_eq!(cli.min_price, -5.0);
        assert_eq!(cli.max_price, -1.5);
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let missing = anyhow::Error::from(CleanError::MissingInputFile {
            reference: "sample.csv:latest".to_string(),
            path: None,
        });
        assert_eq!(exit_code(&missing), 2);

        let config = anyhow::Error::from(CleanError::Config("bad".to_string()));
        assert_eq!(exit_code(&config), 3);

        let store = anyhow::Error::from(CleanError::from(StoreError::ArtifactNotFound("x".to_string())));
        assert_eq!(exit_code(&store), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
