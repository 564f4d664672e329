//! Output tables for the anticholinergic burden panel.
//!
//! Panels and presence windows are converted into Polars DataFrames and
//! written as delimited text. Every write reports the row count and a
//! SHA-256 digest of the bytes, so re-runs can be compared byte for byte.

mod error;
mod frame;
mod writer;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use acb_core::EnrichedPanel;
use acb_model::{PresenceWindow, SubjectId};

pub use error::{OutputError, Result};
pub use frame::panel_frame;
use frame::presence_frame;
pub use writer::{WrittenFile, write_frame};
use writer::{commit_tables, encode_table};

/// Write panels into `dir` as `<stem>.csv`, where the stem follows each
/// panel's granularity (`id_months`, `id_years`).
///
/// Every panel is encoded before the first file is staged, and no file is
/// renamed into place unless all of them were staged.
pub fn write_panels(
    panels: &[&EnrichedPanel],
    dir: &Path,
    separator: char,
) -> Result<Vec<WrittenFile>> {
    let tables = panels
        .iter()
        .map(|panel| {
            let mut df = panel_frame(panel)?;
            encode_table(&mut df, &panel_path(panel, dir), separator)
        })
        .collect::<Result<Vec<_>>>()?;
    commit_tables(tables)
}

fn panel_path(panel: &EnrichedPanel, dir: &Path) -> PathBuf {
    dir.join(format!("{}.csv", panel.granularity().output_stem()))
}

/// Write presence windows as a comma separated `id_present.csv` in `dir`.
pub fn write_presence(
    windows: &BTreeMap<SubjectId, PresenceWindow>,
    dir: &Path,
) -> Result<WrittenFile> {
    let mut df = presence_frame(windows)?;
    write_frame(&mut df, &dir.join("id_present.csv"), ',')
}
