//! Error types for input loading.
//!
//! Every variant here is structural: a file that cannot be read or lacks a
//! required column. Bad cell values never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading an input table.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// The CSV reader rejected the file.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// File has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    // === Schema Errors ===
    /// Required column not found.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Table does not have enough columns of a positional kind.
    #[error("expected {expected} {kind} columns in {path}, found {found}")]
    TooFewColumns {
        kind: &'static str,
        expected: usize,
        found: usize,
        path: PathBuf,
    },
}

impl IngestError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::FileRead { path, source }
        }
    }

    pub(crate) fn missing_column(column: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            path: path.into(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/bmi.csv"),
        };
        assert_eq!(err.to_string(), "input file not found: /data/bmi.csv");
    }

    #[test]
    fn test_not_found_is_mapped() {
        let io = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert!(matches!(
            IngestError::read("x.csv", io),
            IngestError::FileNotFound { .. }
        ));
        let io = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(
            IngestError::read("x.csv", io),
            IngestError::FileRead { .. }
        ));
    }
}
