//! Merging the harmonized scales into one drug by scale table.
//!
//! The nine core scales plus a few add-on drugs from Kiesel and Duran are
//! outer-joined on the drug name. For each drug the number of scales giving
//! each score (0, 0.5, 1, 2, 3) is counted and the meta score is the mean of
//! those scores. The full Kiesel and Duran columns follow. Missing scores
//! become 0 and drugs that no measure scores above 0 are dropped.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::error::Result;
use crate::scale::ScaleName;

/// Kiesel drugs that appear on none of the core scales.
pub const KIESEL_ADD_ON: [&str; 4] = [
    "rotigotine",
    "aclidinium bromide",
    "dimetindene",
    "etoricoxib",
];

/// Duran drugs that appear on none of the core scales.
pub const DURAN_ADD_ON: [&str; 1] = ["ketotifen"];

/// Scores that are counted, with their count column names.
pub const SCORE_LEVELS: [(f64, &str); 5] = [
    (0.0, "aa_0"),
    (0.5, "aa_05"),
    (1.0, "aa_1"),
    (2.0, "aa_2"),
    (3.0, "aa_3"),
];

const CORE_WIDTH: usize = ScaleName::CORE.len() + 2;

/// Rescaled, deduplicated scores per scale.
pub type ScaleScores = BTreeMap<ScaleName, BTreeMap<String, Option<f64>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRow {
    pub drug: String,
    /// Core scales in [`ScaleName::CORE`] order, then the Kiesel and Duran
    /// add-on columns.
    pub core: [f64; CORE_WIDTH],
    pub counts: [u32; SCORE_LEVELS.len()],
    pub meta: f64,
    pub kiesel: f64,
    pub duran: f64,
}

impl CombinedRow {
    fn is_scored(&self) -> bool {
        self.counts[1..].iter().any(|c| *c != 0)
            || self.kiesel != 0.0
            || self.duran != 0.0
            || self.meta != 0.0
    }
}

fn score(scores: &ScaleScores, scale: ScaleName, drug: &str) -> Option<f64> {
    scores.get(&scale)?.get(drug).copied().flatten()
}

fn add_on(scores: &ScaleScores, scale: ScaleName, allowed: &[&str], drug: &str) -> Option<f64> {
    if allowed.contains(&drug) {
        score(scores, scale, drug)
    } else {
        None
    }
}

/// Combine the per-scale scores, sorted by drug name.
pub fn combine(scores: &ScaleScores) -> Vec<CombinedRow> {
    let mut drugs: BTreeSet<&str> = BTreeSet::new();
    for scale in ScaleName::CORE {
        if let Some(entries) = scores.get(&scale) {
            drugs.extend(entries.keys().map(String::as_str));
        }
    }
    drugs.extend(
        KIESEL_ADD_ON
            .iter()
            .copied()
            .filter(|d| score_present(scores, ScaleName::Kiesel, d)),
    );
    drugs.extend(
        DURAN_ADD_ON
            .iter()
            .copied()
            .filter(|d| score_present(scores, ScaleName::Duran, d)),
    );
    for scale in [ScaleName::Kiesel, ScaleName::Duran] {
        if let Some(entries) = scores.get(&scale) {
            drugs.extend(entries.keys().map(String::as_str));
        }
    }

    drugs
        .into_iter()
        .map(|drug| {
            let mut core: [Option<f64>; CORE_WIDTH] = [None; CORE_WIDTH];
            for (slot, scale) in core.iter_mut().zip(ScaleName::CORE) {
                *slot = score(scores, scale, drug);
            }
            core[CORE_WIDTH - 2] = add_on(scores, ScaleName::Kiesel, &KIESEL_ADD_ON, drug);
            core[CORE_WIDTH - 1] = add_on(scores, ScaleName::Duran, &DURAN_ADD_ON, drug);

            let mut counts = [0u32; SCORE_LEVELS.len()];
            for value in core.iter().flatten() {
                if let Some(level) = SCORE_LEVELS.iter().position(|(s, _)| s == value) {
                    counts[level] += 1;
                }
            }
            let total: u32 = counts.iter().sum();
            let meta = if total == 0 {
                0.0
            } else {
                SCORE_LEVELS
                    .iter()
                    .zip(counts)
                    .map(|((s, _), c)| s * f64::from(c))
                    .sum::<f64>()
                    / f64::from(total)
            };

            CombinedRow {
                drug: drug.to_string(),
                core: core.map(|v| v.unwrap_or(0.0)),
                counts,
                meta,
                kiesel: score(scores, ScaleName::Kiesel, drug).unwrap_or(0.0),
                duran: score(scores, ScaleName::Duran, drug).unwrap_or(0.0),
            }
        })
        .filter(CombinedRow::is_scored)
        .collect()
}

fn score_present(scores: &ScaleScores, scale: ScaleName, drug: &str) -> bool {
    scores
        .get(&scale)
        .is_some_and(|entries| entries.contains_key(drug))
}

/// Output column names in order.
pub fn combined_columns() -> Vec<String> {
    let mut names = vec!["drug".to_string()];
    names.extend(ScaleName::CORE.iter().map(|s| s.column()));
    names.push("aa_kiesel_add_on".to_string());
    names.push("aa_duran_add_on".to_string());
    names.extend(SCORE_LEVELS.iter().map(|(_, name)| (*name).to_string()));
    names.push("aa_meta".to_string());
    names.push(ScaleName::Kiesel.column());
    names.push(ScaleName::Duran.column());
    names
}

pub fn combined_frame(rows: &[CombinedRow]) -> Result<DataFrame> {
    let names = combined_columns();
    let mut columns: Vec<Column> = Vec::with_capacity(names.len());
    let mut names = names.into_iter();
    let mut next_name = || names.next().unwrap_or_default();

    let drugs: Vec<&str> = rows.iter().map(|r| r.drug.as_str()).collect();
    columns.push(Series::new(next_name().into(), drugs).into());
    for idx in 0..CORE_WIDTH {
        let values: Vec<f64> = rows.iter().map(|r| r.core[idx]).collect();
        columns.push(Series::new(next_name().into(), values).into());
    }
    for idx in 0..SCORE_LEVELS.len() {
        let values: Vec<u32> = rows.iter().map(|r| r.counts[idx]).collect();
        columns.push(Series::new(next_name().into(), values).into());
    }
    for pick in [
        (|r: &CombinedRow| r.meta) as fn(&CombinedRow) -> f64,
        |r| r.kiesel,
        |r| r.duran,
    ] {
        let values: Vec<f64> = rows.iter().map(pick).collect();
        columns.push(Series::new(next_name().into(), values).into());
    }
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(entries: &[(&str, f64)]) -> BTreeMap<String, Option<f64>> {
        entries
            .iter()
            .map(|(d, s)| ((*d).to_string(), Some(*s)))
            .collect()
    }

    #[test]
    fn counts_and_meta_score() {
        let mut scores = ScaleScores::new();
        scores.insert(ScaleName::Ancelin, scale(&[("amitriptyline", 3.0), ("codeine", 1.0)]));
        scores.insert(ScaleName::Chew, scale(&[("amitriptyline", 3.0), ("codeine", 0.0)]));
        scores.insert(ScaleName::Han, scale(&[("amitriptyline", 2.0)]));

        let rows = combine(&scores);
        assert_eq!(rows.len(), 2);
        let ami = &rows[0];
        assert_eq!(ami.drug, "amitriptyline");
        assert_eq!(ami.counts, [0, 0, 0, 1, 2]);
        assert!((ami.meta - 8.0 / 3.0).abs() < 1e-12);
        let codeine = &rows[1];
        assert_eq!(codeine.counts, [1, 0, 1, 0, 0]);
        assert_eq!(codeine.meta, 0.5);
    }

    #[test]
    fn unscored_drugs_are_dropped_and_add_ons_counted() {
        let mut scores = ScaleScores::new();
        scores.insert(ScaleName::Ancelin, scale(&[("water", 0.0)]));
        scores.insert(
            ScaleName::Kiesel,
            scale(&[("rotigotine", 1.0), ("amitriptyline", 3.0)]),
        );
        scores.insert(ScaleName::Duran, scale(&[("ketotifen", 3.0)]));

        let rows = combine(&scores);
        let drugs: Vec<&str> = rows.iter().map(|r| r.drug.as_str()).collect();
        assert_eq!(drugs, vec!["amitriptyline", "ketotifen", "rotigotine"]);

        // Kiesel-only drugs outside the add-on list only carry the Kiesel column.
        assert_eq!(rows[0].counts.iter().sum::<u32>(), 0);
        assert_eq!(rows[0].kiesel, 3.0);
        assert_eq!(rows[1].counts[4], 1);
        assert_eq!(rows[2].core[CORE_WIDTH - 2], 1.0);
        assert_eq!(rows[2].counts[2], 1);
    }

    #[test]
    fn frame_has_all_columns() {
        let mut scores = ScaleScores::new();
        scores.insert(ScaleName::Ancelin, scale(&[("amitriptyline", 3.0)]));
        let df = combined_frame(&combine(&scores)).unwrap();
        assert_eq!(df.width(), combined_columns().len());
        assert_eq!(df.height(), 1);
    }
}
