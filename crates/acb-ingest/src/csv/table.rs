//! In-memory CSV tables with header lookup.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::{debug, warn};

use super::options::CsvOptions;
use crate::error::{IngestError, Result};

/// A fully loaded CSV file: normalized headers plus trimmed cells.
///
/// Every row has exactly `headers.len()` cells; short records are padded
/// with empty strings.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().to_string()
}

impl CsvTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column that must exist.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| IngestError::missing_column(name, &self.path))
    }

    /// Non-empty cell value at `row`/`col`.
    pub fn value<'a>(&self, row: &'a [String], col: usize) -> Option<&'a str> {
        row.get(col)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Read a delimited file into a [`CsvTable`].
///
/// The file is decoded with the configured encoding before parsing, so
/// Windows-1252 extracts come out as valid UTF-8. Rows whose cells are all
/// empty are skipped.
pub fn read_csv_table(path: &Path, options: &CsvOptions) -> Result<CsvTable> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::read(path, e))?;
    let (text, _, had_errors) = options.encoding.encoding().decode(&bytes);
    if had_errors {
        warn!(
            path = %path.display(),
            encoding = options.encoding.encoding().name(),
            "input contained malformed byte sequences; replaced"
        );
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(options.delimiter_byte())
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            row.push(record.get(idx).map(normalize_cell).unwrap_or_default());
        }
        rows.push(row);
    }

    debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        "csv loaded"
    );
    Ok(CsvTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}
