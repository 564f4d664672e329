use std::path::PathBuf;

use acb_output::WrittenFile;

#[derive(Debug)]
pub struct RunResult {
    pub command: &'static str,
    pub output_dir: PathBuf,
    pub files: Vec<FileSummary>,
}

/// One written table and the rows that did not make it in.
#[derive(Debug)]
pub struct FileSummary {
    pub label: String,
    pub written: WrittenFile,
    /// Input rows dropped while loading (placeholder or unparsable dates).
    pub excluded: Option<usize>,
    /// Grid rows removed by censoring.
    pub censored: Option<usize>,
}
