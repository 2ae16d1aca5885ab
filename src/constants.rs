/// Column names the cleaner knows about
pub const PRICE_COLUMN: &str = "price";
pub const LONGITUDE_COLUMN: &str = "longitude";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LAST_REVIEW_COLUMN: &str = "last_review";

/// Columns that must be present on every output row (when the column exists)
pub const KEY_COLUMNS: [&str; 3] = [PRICE_COLUMN, LATITUDE_COLUMN, LONGITUDE_COLUMN];

// NYC bounding box, inclusive on both ends
pub const MIN_LONGITUDE: f64 = -74.25;
pub const MAX_LONGITUDE: f64 = -73.50;
pub const MIN_LATITUDE: f64 = 40.5;
pub const MAX_LATITUDE: f64 = 41.2;

pub const JOB_TYPE: &str = "basic_cleaning";
pub const DEFAULT_OUTPUT_FILE: &str = "clean_sample.csv";
pub const DEFAULT_CONFIG_FILE: &str = "basic_cleaning.toml";
pub const DEFAULT_STORE_ROOT: &str = "artifacts";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Cell contents read as the missing-marker.
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check whether a raw cell should load as missing. Matches the exact cell
/// text, so `" NA "` stays text.
pub fn is_na_token(raw: &str) -> bool {
    NA_VALUES.contains(&raw)
}
