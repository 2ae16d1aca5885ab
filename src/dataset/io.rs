use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime};

use super::model::{Dataset, Value};
use crate::error::Result;

const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Load a comma-delimited file with a header row.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    read_csv(file)
}

/// Parse CSV from any reader. Records with a field count different from the
/// header are an error.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut dataset = Dataset::new(headers);
    for result in reader.records() {
        let record = result?;
        dataset.push_row(record.iter().map(Value::from_raw).collect());
    }
    Ok(dataset)
}

/// Write the dataset to `path`, header first, no index column.
pub fn write_csv_file(dataset: &Dataset, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    write_csv(dataset, file)
}

pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(dataset.columns())?;

    // A date column prints without a time part when every value is at midnight
    let formats: Vec<&str> = (0..dataset.columns().len())
        .map(|idx| date_format_for(dataset, idx))
        .collect();

    for row in dataset.rows() {
        let fields = row.iter().zip(&formats).map(|(cell, fmt)| match cell {
            Value::Missing => String::new(),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format(fmt).to_string(),
        });
        writer.write_record(fields)?;
    }
    writer.flush()?;
    Ok(())
}

fn date_format_for(dataset: &Dataset, idx: usize) -> &'static str {
    let all_midnight = dataset
        .rows()
        .iter()
        .filter_map(|row| row[idx].as_date())
        .all(|d: &NaiveDateTime| d.time() == NaiveTime::MIN);
    if all_midnight {
        DATE_ONLY_FORMAT
    } else {
        DATE_TIME_FORMAT
    }
}
