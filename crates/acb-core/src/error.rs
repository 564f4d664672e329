//! Errors raised by the panel engine.

use std::path::PathBuf;

use acb_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    /// An input table could not be loaded.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// Two assembly steps produced the same output column.
    #[error("column '{column}' added by step '{step}' already exists in the panel")]
    DuplicateColumn { column: String, step: String },

    /// An aggregation column is not part of the loaded event table.
    #[error("aggregation column '{column}' is not in the event table")]
    UnknownColumn { column: String },

    #[error("no usable events in {path}")]
    EmptyEvents { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, PanelError>;
