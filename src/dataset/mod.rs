pub mod io;
pub mod model;

pub use io::{load_csv, read_csv, write_csv, write_csv_file};
pub use model::{Dataset, Value};
