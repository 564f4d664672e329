//! Input loading for the anticholinergic burden panel.
//!
//! This crate reads the pipeline's delimited input files, including the
//! Windows-1252 prescription extracts, and converts them into the typed
//! tables the panel engine consumes.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use acb_ingest::{CsvOptions, load_visit_dates, load_visit_series};
//!
//! let dir = Path::new("data");
//! let dates = load_visit_dates(&dir.join("test_date.csv"), &CsvOptions::default())?;
//! let smoking = load_visit_series(&dir.join("tobacco.csv"), &CsvOptions::default(), "smoking")?;
//! ```

mod csv;
mod error;
mod loaders;
mod tables;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use crate::csv::{CsvOptions, CsvTable, TextEncoding, read_csv_table};

// === Typed Loaders ===
pub use loaders::{
    DATA_PROVIDER_COLUMN, DATE_COLUMN, ID_COLUMN, TIME_IN_SAMPLE_COLUMN, birth_date,
    load_demographics, load_events, load_mortality, load_prescription_log, load_presence_table,
    load_static_table, load_visit_answers, load_visit_dates, load_visit_series,
};

// === Table Types ===
pub use tables::{EventLoad, LogEntry, StaticTable, VisitAnswers};
