//! Published anticholinergic scales and their score conventions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use acb_common::parse_f64;
use acb_ingest::{CsvOptions, read_csv_table};
use tracing::debug;

use crate::error::{Result, ScalesError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScaleName {
    Ancelin,
    Boustani,
    Carnahan,
    Cancelli,
    Chew,
    Rudolph,
    Ehrt,
    Han,
    Sittironnarit,
    Duran,
    Kiesel,
}

impl ScaleName {
    pub const ALL: [ScaleName; 11] = [
        ScaleName::Kiesel,
        ScaleName::Ancelin,
        ScaleName::Boustani,
        ScaleName::Carnahan,
        ScaleName::Cancelli,
        ScaleName::Chew,
        ScaleName::Rudolph,
        ScaleName::Ehrt,
        ScaleName::Han,
        ScaleName::Sittironnarit,
        ScaleName::Duran,
    ];

    /// Scales that feed the score counts directly, in output column order.
    pub const CORE: [ScaleName; 9] = [
        ScaleName::Ancelin,
        ScaleName::Chew,
        ScaleName::Cancelli,
        ScaleName::Han,
        ScaleName::Rudolph,
        ScaleName::Ehrt,
        ScaleName::Sittironnarit,
        ScaleName::Boustani,
        ScaleName::Carnahan,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScaleName::Ancelin => "Ancelin",
            ScaleName::Boustani => "Boustani",
            ScaleName::Carnahan => "Carnahan",
            ScaleName::Cancelli => "Cancelli",
            ScaleName::Chew => "Chew",
            ScaleName::Rudolph => "Rudolph",
            ScaleName::Ehrt => "Ehrt",
            ScaleName::Han => "Han",
            ScaleName::Sittironnarit => "Sittironnarit",
            ScaleName::Duran => "Duran",
            ScaleName::Kiesel => "Kiesel",
        }
    }

    /// Input file name, `<Label>.csv`.
    pub fn file_name(self) -> String {
        format!("{}.csv", self.label())
    }

    /// Output column, `aa_<label>`.
    pub fn column(self) -> String {
        format!("aa_{}", self.label().to_ascii_lowercase())
    }

    /// Map a score onto the common 0 to 3 range. Ehrt uses 1 to 4 and Duran
    /// uses 0.5 to 2; other scales are already aligned.
    pub fn rescale(self, score: f64) -> f64 {
        match self {
            ScaleName::Ehrt if score == 2.0 => 1.0,
            ScaleName::Ehrt if score == 3.0 => 2.0,
            ScaleName::Ehrt if score == 4.0 => 3.0,
            ScaleName::Duran if score == 2.0 => 3.0,
            ScaleName::Duran if score == 1.0 => 2.0,
            ScaleName::Duran if score == 0.5 => 1.0,
            _ => score,
        }
    }
}

impl fmt::Display for ScaleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower-cased, trimmed drug name.
pub fn normalize_drug_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One scale: drug names with their scores, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    pub name: ScaleName,
    pub entries: Vec<(String, Option<f64>)>,
}

impl Scale {
    /// Read `<dir>/<Label>.csv`. The first column is the drug name and the
    /// second the score, whatever their headers.
    pub fn load(dir: &Path, name: ScaleName) -> Result<Self> {
        let path = dir.join(name.file_name());
        let table = read_csv_table(&path, &CsvOptions::default())?;
        if table.headers.len() < 2 {
            return Err(ScalesError::ScaleShape { path });
        }
        let entries: Vec<(String, Option<f64>)> = table
            .rows
            .iter()
            .filter_map(|row| {
                let drug = normalize_drug_name(table.value(row, 0)?);
                let score = table.value(row, 1).and_then(parse_f64);
                Some((drug, score))
            })
            .filter(|(drug, _)| !drug.is_empty())
            .collect();
        debug!(scale = %name, entries = entries.len(), "scale loaded");
        Ok(Self { name, entries })
    }

    /// One entry per drug, keeping the highest score, with scores rescaled.
    pub fn scores(&self) -> BTreeMap<String, Option<f64>> {
        let mut out: BTreeMap<String, Option<f64>> = BTreeMap::new();
        for (drug, score) in &self.entries {
            let score = score.map(|s| self.name.rescale(s));
            out.entry(drug.clone())
                .and_modify(|existing| {
                    if score > *existing {
                        *existing = score;
                    }
                })
                .or_insert(score);
        }
        out
    }
}
