//! Typed tables handed from ingestion to the panel engine.

use std::collections::BTreeMap;

use acb_model::{EventTable, SubjectId, VISIT_COUNT, Visit};
use chrono::NaiveDate;

/// Subject-level columns carried through unchanged (left join).
#[derive(Debug, Clone, Default)]
pub struct StaticTable {
    pub columns: Vec<String>,
    pub rows: BTreeMap<SubjectId, Vec<Option<String>>>,
}

impl StaticTable {
    pub fn get(&self, subject: &SubjectId) -> Option<&[Option<String>]> {
        self.rows.get(subject).map(Vec::as_slice)
    }
}

/// Raw answers to a multi-part survey question, grouped by visit.
///
/// Each visit holds the non-empty cells of its sub-question columns in
/// column order, before any recoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitAnswers([Vec<String>; VISIT_COUNT]);

impl VisitAnswers {
    pub fn new(answers: [Vec<String>; VISIT_COUNT]) -> Self {
        Self(answers)
    }

    pub fn get(&self, visit: Visit) -> &[String] {
        &self.0[visit.index()]
    }
}

/// Events plus the counts of rows dropped while loading them.
#[derive(Debug, Clone, Default)]
pub struct EventLoad {
    pub table: EventTable,
    /// Rows dated on one of the invalid placeholder dates.
    pub placeholder_dates: usize,
    /// Rows with an empty or unparsable date.
    pub unparsable_dates: usize,
    /// Rows without a subject id.
    pub missing_ids: usize,
}

impl EventLoad {
    pub fn dropped(&self) -> usize {
        self.placeholder_dates + self.unparsable_dates + self.missing_ids
    }
}

/// One row of the raw prescription log; `date` is `None` when unparsable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub subject: SubjectId,
    pub date: Option<NaiveDate>,
}
