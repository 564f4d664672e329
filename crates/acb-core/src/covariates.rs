//! Covariate values per visit, before resolution.
//!
//! Single-column covariates have their non-answer codes removed. Covariates
//! asked as several sub-questions per visit are first reduced to one coarse
//! code per visit by recoding each answer and keeping the highest-priority
//! code present.

use std::collections::BTreeMap;

use acb_common::{format_numeric, parse_f64};
use acb_ingest::VisitAnswers;
use acb_model::{SubjectId, Visit, VisitSeries};
use serde::{Deserialize, Serialize};

/// Recoding applied to multi-part survey questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Derivation {
    /// Qualifications: `1` (college or university degree) against `0` for
    /// every other answer including "none of the above".
    Education,
    /// Physical activity type: `1` light, `2` moderate, `3` strenuous.
    Activity,
}

impl Derivation {
    /// Coarse code of one raw answer; `None` for non-answers.
    pub fn recode(self, raw: &str) -> Option<u8> {
        let number = parse_f64(raw)?;
        if number.fract() != 0.0 {
            return None;
        }
        match (self, number as i64) {
            (Derivation::Education, 1) => Some(1),
            (Derivation::Education, 2..=6 | -7) => Some(0),
            (Derivation::Activity, 1 | 4) => Some(1),
            (Derivation::Activity, 2 | 5) => Some(2),
            (Derivation::Activity, 3) => Some(3),
            _ => None,
        }
    }

    /// Codes from strongest to weakest.
    pub fn priority(self) -> &'static [u8] {
        match self {
            Derivation::Education => &[1, 0],
            Derivation::Activity => &[3, 2, 1],
        }
    }

    /// The strongest code among one visit's answers.
    pub fn derive_visit(self, answers: &[String]) -> Option<u8> {
        let codes: Vec<u8> = answers.iter().filter_map(|raw| self.recode(raw)).collect();
        self.priority()
            .iter()
            .copied()
            .find(|code| codes.contains(code))
    }

    pub fn derive(self, answers: &VisitAnswers) -> VisitSeries {
        VisitSeries::new(
            Visit::ALL.map(|visit| {
                self.derive_visit(answers.get(visit))
                    .map(|code| code.to_string())
            }),
        )
    }
}

fn is_non_answer(value: &str, codes: &[f64]) -> bool {
    parse_f64(value).is_some_and(|number| codes.contains(&number))
}

/// Drop non-answer codes from a series; other values are kept verbatim
/// apart from numeric formatting (`2.0` becomes `2`).
pub fn normalize_series(series: &VisitSeries, non_answer_codes: &[f64]) -> VisitSeries {
    VisitSeries::new(Visit::ALL.map(|visit| {
        series
            .get(visit)
            .filter(|value| !is_non_answer(value, non_answer_codes))
            .map(|value| match parse_f64(value) {
                Some(number) => format_numeric(number),
                None => value.to_string(),
            })
    }))
}

/// A covariate ready for resolution: per-subject values at each visit.
#[derive(Debug, Clone, Default)]
pub struct CovariateTable {
    pub name: String,
    pub series: BTreeMap<SubjectId, VisitSeries>,
}

impl CovariateTable {
    pub fn from_series(
        name: impl Into<String>,
        raw: &BTreeMap<SubjectId, VisitSeries>,
        non_answer_codes: &[f64],
    ) -> Self {
        Self {
            name: name.into(),
            series: raw
                .iter()
                .map(|(subject, series)| (subject.clone(), normalize_series(series, non_answer_codes)))
                .collect(),
        }
    }

    pub fn from_answers(
        name: impl Into<String>,
        answers: &BTreeMap<SubjectId, VisitAnswers>,
        derivation: Derivation,
    ) -> Self {
        Self {
            name: name.into(),
            series: answers
                .iter()
                .map(|(subject, answers)| (subject.clone(), derivation.derive(answers)))
                .collect(),
        }
    }

    pub fn get(&self, subject: &SubjectId) -> Option<&VisitSeries> {
        self.series.get(subject)
    }
}
