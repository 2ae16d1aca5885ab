use tracing::{info, instrument, warn};

use super::dates::parse_date;
use crate::constants::{
    KEY_COLUMNS, LAST_REVIEW_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN, MAX_LATITUDE,
    MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE, PRICE_COLUMN,
};
use crate::dataset::{Dataset, Value};
use crate::metrics::CleanerMetrics;

/// Inclusive range check. Missing or non-numeric values never match.
fn in_range(value: &Value, lo: f64, hi: f64) -> bool {
    value.as_f64().map(|v| lo <= v && v <= hi).unwrap_or(false)
}

/// Keep rows with `min_price <= price <= max_price`. Returns rows dropped.
#[instrument(skip(dataset), fields(rows = dataset.len()))]
pub fn filter_price(dataset: &mut Dataset, min_price: f64, max_price: f64) -> usize {
    info!("Filtering price between {} and {}", min_price, max_price);
    let dropped = match dataset.column_index(PRICE_COLUMN) {
        Some(idx) => dataset.retain_rows(|row| in_range(&row[idx], min_price, max_price)),
        None => {
            warn!("No '{}' column; no row can satisfy the price range", PRICE_COLUMN);
            dataset.retain_rows(|_| false)
        }
    };
    info!(dropped, remaining = dataset.len(), "Price filter done");
    CleanerMetrics::record_rows_dropped("price", dropped);
    dropped
}

/// Keep rows inside the NYC bounding box. `None` when either coordinate
/// column is absent and the stage was skipped.
#[instrument(skip(dataset), fields(rows = dataset.len()))]
pub fn filter_geo(dataset: &mut Dataset) -> Option<usize> {
    let lon = dataset.column_index(LONGITUDE_COLUMN)?;
    let lat = dataset.column_index(LATITUDE_COLUMN)?;
    info!("Applying NYC latitude/longitude bounds");
    let dropped = dataset.retain_rows(|row| {
        in_range(&row[lon], MIN_LONGITUDE, MAX_LONGITUDE)
            && in_range(&row[lat], MIN_LATITUDE, MAX_LATITUDE)
    });
    info!(dropped, remaining = dataset.len(), "Geo filter done");
    CleanerMetrics::record_rows_dropped("geo", dropped);
    Some(dropped)
}

/// Parse `last_review` into dates; unparseable values become missing.
/// Returns the number of values coerced to missing, or `None` when the
/// column is absent.
#[instrument(skip(dataset), fields(rows = dataset.len()))]
pub fn normalize_last_review(dataset: &mut Dataset) -> Option<usize> {
    let idx = dataset.column_index(LAST_REVIEW_COLUMN)?;
    info!("Parsing {} to datetime", LAST_REVIEW_COLUMN);
    let mut coerced = 0;
    dataset.map_column(idx, |cell| match cell {
        Value::Text(raw) => match parse_date(raw) {
            Some(d) => Value::Date(d),
            None => {
                coerced += 1;
                Value::Missing
            }
        },
        other => other.clone(),
    });
    if coerced > 0 {
        warn!("{} {} values could not be parsed", coerced, LAST_REVIEW_COLUMN);
    }
    info!(coerced, remaining = dataset.len(), "Date normalization done");
    Some(coerced)
}

/// Drop rows missing any key column that the dataset has.
#[instrument(skip(dataset), fields(rows = dataset.len()))]
pub fn drop_incomplete(dataset: &mut Dataset) -> usize {
    let key_idx: Vec<usize> = KEY_COLUMNS
        .iter()
        .filter_map(|c| dataset.column_index(c))
        .collect();
    if key_idx.is_empty() {
        info!("No key columns present; keeping all rows");
        return 0;
    }
    info!("Dropping rows with missing key values");
    let dropped = dataset.retain_rows(|row| key_idx.iter().all(|&i| !row[i].is_missing()));
    info!(dropped, remaining = dataset.len(), "Completeness check done");
    CleanerMetrics::record_rows_dropped("completeness", dropped);
    dropped
}
