//! CSV reading utilities.

mod options;
mod table;

pub use options::{CsvOptions, TextEncoding};
pub use table::{CsvTable, read_csv_table};
