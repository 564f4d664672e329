//! Anticholinergic scale harmonization.
//!
//! Reads the eleven published scales, rewrites brand and alternative drug
//! names to generic names, and merges the scales into one table with score
//! counts and a meta score. This is reference-data preparation; the panel
//! engine only consumes its result through the event table's scale columns.

mod combine;
mod error;
mod names;
mod scale;

use std::path::Path;
use std::time::Instant;

use acb_output::{WrittenFile, write_frame};
use tracing::{info, info_span};

pub use combine::{
    CombinedRow, DURAN_ADD_ON, KIESEL_ADD_ON, SCORE_LEVELS, ScaleScores, combine,
    combined_columns, combined_frame,
};
pub use error::{Result, ScalesError};
pub use names::NameRewriter;
pub use scale::{Scale, ScaleName, normalize_drug_name};

/// Default name of the brand to generic table.
pub const DRUG_NAMES_FILE: &str = "alternative drug names_reformatted.csv";
/// Default name of the combined output table.
pub const COMBINED_FILE: &str = "aas_combined.csv";

/// Load every scale from `dir`, harmonize names and combine.
pub fn harmonize(dir: &Path, names_file: &Path) -> Result<Vec<CombinedRow>> {
    let span = info_span!("scales", dir = %dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    let rewriter = NameRewriter::load(names_file)?;
    let mut scores = ScaleScores::new();
    let mut renamed = 0usize;
    for name in ScaleName::ALL {
        let mut scale = Scale::load(dir, name)?;
        renamed += rewriter.apply(&mut scale);
        scores.insert(name, scale.scores());
    }
    let rows = combine(&scores);

    info!(
        rules = rewriter.len(),
        renamed,
        drugs = rows.len(),
        duration_ms = start.elapsed().as_millis(),
        "scales harmonized"
    );
    Ok(rows)
}

/// Write the combined table as comma separated text.
pub fn write_combined(rows: &[CombinedRow], path: &Path) -> Result<WrittenFile> {
    let mut df = combined_frame(rows)?;
    Ok(write_frame(&mut df, path, ',')?)
}
