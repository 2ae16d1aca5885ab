use anyhow::Result;
use basic_cleaning::artifacts::{ArtifactStore, ArtifactSubmission, LocalArtifactStore};
use basic_cleaning::constants::{MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};
use basic_cleaning::dataset::{load_csv, Value};
use basic_cleaning::{CleanArgs, CleanError, Cleaner, StoreError};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

const RAW_LISTINGS: &str = "\
id,name,host_id,neighbourhood,latitude,longitude,price,last_review,reviews_per_month
2539,Clean & quiet apt home by the park,2787,Kensington,40.64749,-73.97237,149,2018-10-19,0.21
2595,Skylit Midtown Castle,2845,Midtown,40.75362,-73.98377,225,2019-05-21,0.38
3647,THE VILLAGE OF HARLEM,4632,Harlem,40.80902,-73.94190,150,,
3831,Cozy Entire Floor of Brownstone,4869,Clinton Hill,40.68514,-73.95976,89,2019-07-05,4.64
5022,Entire Apt: Spacious Studio/Loft,7192,East Harlem,40.79851,-73.94399,80,not recorded,0.10
5099,Large Cozy 1 BR Apartment,7322,Murray Hill,40.74767,-73.97500,2000,2019-06-22,0.59
5121,BlissArtsSpace!,7356,Bedford-Stuyvesant,40.68688,-73.95596,5,2017-10-05,0.40
5178,Large Furnished Room Near B'way,8967,Hell's Kitchen,,-73.98493,79,2019-06-24,3.47
5203,Cozy Clean Guest Room,7490,Upper West Side,40.80178,-80.50000,79,2017-07-21,0.99
";

fn args(min_price: f64, max_price: f64) -> CleanArgs {
    CleanArgs {
        input_artifact: "nyc/proj/sample.csv:latest".to_string(),
        output_artifact: "clean_sample.csv".to_string(),
        output_type: "clean_sample".to_string(),
        output_description: "Data with outliers and null values removed".to_string(),
        min_price,
        max_price,
    }
}

fn seed(store: &LocalArtifactStore, dir: &Path, name: &str, contents: &str) -> Result<()> {
    let file = dir.join(name);
    fs::write(&file, contents)?;
    let run = store.start_run("seed")?;
    store.log_artifact(&run, ArtifactSubmission::new(name, "raw_data", "raw listings").add_file(&file))?;
    Ok(())
}

#[test]
fn clean_run_filters_and_logs_new_artifact() -> Result<()> {
    let temp_dir = tempdir()?;
    let store_root = temp_dir.path().join("store");
    let store = Arc::new(LocalArtifactStore::open(&store_root)?);
    seed(&store, temp_dir.path(), "sample.csv", RAW_LISTINGS)?;

    let output = temp_dir.path().join("out").join("clean_sample.csv");
    let cleaner = Cleaner::new(store.clone(), &output);
    let report = cleaner.run(&args(10.0, 350.0))?;

    assert_eq!(report.counts.rows_in, 9);
    assert_eq!(report.counts.after_price, 7);
    assert_eq!(report.counts.after_geo, Some(5));
    assert_eq!(report.counts.dates_coerced, Some(1));
    assert_eq!(report.counts.rows_out, 5);
    assert_eq!(report.artifact.reference(), "clean_sample.csv:v0");
    assert_eq!(report.artifact.artifact_type, "clean_sample");

    let cleaned = load_csv(&output)?;
    assert_eq!(cleaned.columns()[0], "id");
    assert_eq!(cleaned.columns().len(), 9);
    for row in 0..cleaned.len() {
        let price = cleaned.get(row, "price").and_then(Value::as_f64).unwrap();
        assert!((10.0..=350.0).contains(&price));
        let lon = cleaned.get(row, "longitude").and_then(Value::as_f64).unwrap();
        let lat = cleaned.get(row, "latitude").and_then(Value::as_f64).unwrap();
        assert!((MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lon));
        assert!((MIN_LATITUDE..=MAX_LATITUDE).contains(&lat));
        match cleaned.get(row, "last_review").unwrap() {
            Value::Missing => {}
            Value::Text(s) => assert!(chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(), "{s}"),
            other => panic!("unexpected cell {other:?}"),
        }
    }

    // Logged artifact holds exactly the file that was written
    let record = store.index().latest("clean_sample.csv")?.expect("logged");
    assert_eq!(fs::read(store.blob_path(&record))?, fs::read(&output)?);
    assert_eq!(record.description, "Data with outliers and null values removed");
    Ok(())
}

#[test]
fn cleaning_the_clean_artifact_changes_nothing() -> Result<()> {
    let temp_dir = tempdir()?;
    let store = Arc::new(LocalArtifactStore::open(temp_dir.path().join("store"))?);
    seed(&store, temp_dir.path(), "sample.csv", RAW_LISTINGS)?;

    let output = temp_dir.path().join("clean_sample.csv");
    Cleaner::new(store.clone(), &output).run(&args(10.0, 350.0))?;
    let first = fs::read_to_string(&output)?;

    let mut again = args(10.0, 350.0);
    again.input_artifact = "clean_sample.csv:v0".to_string();
    let report = Cleaner::new(store.clone(), &output).run(&again)?;

    assert_eq!(fs::read_to_string(&output)?, first);
    assert_eq!(report.counts.rows_in, report.counts.rows_out);
    assert!(report.artifact.deduplicated);
    Ok(())
}

#[test]
fn missing_blob_is_missing_input_file() -> Result<()> {
    let temp_dir = tempdir()?;
    let store = Arc::new(LocalArtifactStore::open(temp_dir.path().join("store"))?);
    seed(&store, temp_dir.path(), "sample.csv", RAW_LISTINGS)?;
    let record = store.index().latest("sample.csv")?.expect("seeded");
    fs::remove_file(store.blob_path(&record))?;

    let output = temp_dir.path().join("clean_sample.csv");
    let err = Cleaner::new(store.clone(), &output)
        .run(&args(10.0, 350.0))
        .unwrap_err();

    assert!(matches!(err, CleanError::MissingInputFile { .. }));
    assert!(!output.exists(), "no transformation should run");
    Ok(())
}

#[test]
fn unknown_input_artifact_fails_before_writing() -> Result<()> {
    let temp_dir = tempdir()?;
    let store = Arc::new(LocalArtifactStore::open(temp_dir.path().join("store"))?);
    let output = temp_dir.path().join("clean_sample.csv");

    let err = Cleaner::new(store, &output).run(&args(10.0, 350.0)).unwrap_err();
    assert!(matches!(err, CleanError::Store(StoreError::ArtifactNotFound(_))));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn dataset_without_geo_or_dates_only_gets_price_and_completeness() -> Result<()> {
    let temp_dir = tempdir()?;
    let store = Arc::new(LocalArtifactStore::open(temp_dir.path().join("store"))?);
    seed(&store, temp_dir.path(), "sample.csv", "id,price,latitude\n1,50,10.0\n2,70,\n3,900,40.7\n")?;

    let output = temp_dir.path().join("clean_sample.csv");
    let report = Cleaner::new(store, &output).run(&args(10.0, 350.0))?;

    assert_eq!(report.counts.after_geo, None);
    assert_eq!(report.counts.dates_coerced, None);
    assert_eq!(report.counts.rows_out, 1);
    assert_eq!(fs::read_to_string(&output)?, "id,price,latitude\n1,50,10.0\n");
    Ok(())
}
