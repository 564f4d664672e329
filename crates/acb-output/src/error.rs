use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to build output table {name}: {source}")]
    Frame {
        name: String,
        #[source]
        source: PolarsError,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("separator {0:?} is not a single ASCII character")]
    InvalidSeparator(char),
}

pub type Result<T> = std::result::Result<T, OutputError>;
