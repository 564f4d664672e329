use std::path::PathBuf;

use acb_ingest::IngestError;
use acb_output::OutputError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScalesError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Output(#[from] OutputError),

    /// A scale file has fewer than the two positional columns (drug, score).
    #[error("scale file {path} needs a drug and a score column")]
    ScaleShape { path: PathBuf },

    #[error("invalid drug name pattern for '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to build combined scale table: {0}")]
    Frame(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, ScalesError>;
