//! The enriched panel table produced by assembly and filtered by censoring.

use acb_model::{Granularity, Period, SubjectId};
use chrono::NaiveDate;

use crate::aggregate::PanelGrid;
use crate::error::{PanelError, Result};

/// Name of the representative date column.
pub const DATE_COLUMN: &str = "date";
/// Name of the per-period event count column.
pub const COUNT_COLUMN: &str = "meds_count";

/// Storage type of a panel column. Fixed per column, never inferred from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Count,
    Number,
    Text,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Count(u64),
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    pub fn number(value: Option<f64>) -> Self {
        value.map_or(Cell::Null, Cell::Number)
    }

    pub fn text(value: Option<&str>) -> Self {
        value.map_or(Cell::Null, |v| Cell::Text(v.to_string()))
    }

    pub fn date(value: Option<NaiveDate>) -> Self {
        value.map_or(Cell::Null, Cell::Date)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Count(v) => Some(*v as f64),
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

/// One `(subject, period)` row with cells aligned to [`EnrichedPanel::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRecord {
    pub subject: SubjectId,
    pub period: Period,
    pub cells: Vec<Cell>,
}

impl PanelRecord {
    /// First day of the period.
    pub fn date(&self) -> NaiveDate {
        self.period.start()
    }
}

/// Panel rows plus their column schema.
///
/// The subject id and period label are implicit leading columns; `columns`
/// describes the cells that follow them.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedPanel {
    granularity: Granularity,
    columns: Vec<ColumnSpec>,
    records: Vec<PanelRecord>,
}

impl EnrichedPanel {
    /// Base table: representative date, event count, column sums and the
    /// subject profile.
    pub fn from_grid(grid: &PanelGrid) -> Self {
        let mut columns = vec![
            ColumnSpec::new(DATE_COLUMN, ColumnKind::Date),
            ColumnSpec::new(COUNT_COLUMN, ColumnKind::Count),
        ];
        columns.extend(
            grid.columns
                .iter()
                .map(|name| ColumnSpec::new(name.as_str(), ColumnKind::Number)),
        );
        columns.push(ColumnSpec::new("data_provider", ColumnKind::Number));
        columns.push(ColumnSpec::new("time_in_sample", ColumnKind::Number));

        let records = grid
            .rows
            .iter()
            .map(|row| {
                let profile = grid.profiles.get(&row.subject).copied().unwrap_or_default();
                let mut cells = Vec::with_capacity(columns.len());
                cells.push(Cell::Date(row.period.start()));
                cells.push(Cell::Count(row.count));
                cells.extend(row.sums.iter().copied().map(Cell::Number));
                cells.push(Cell::number(profile.data_provider));
                cells.push(Cell::number(profile.time_in_sample));
                PanelRecord {
                    subject: row.subject.clone(),
                    period: row.period,
                    cells,
                }
            })
            .collect();

        Self {
            granularity: grid.granularity,
            columns,
            records,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn records(&self) -> &[PanelRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cell of `record` in the named column.
    pub fn cell<'a>(&self, record: &'a PanelRecord, name: &str) -> Option<&'a Cell> {
        self.column_index(name).and_then(|idx| record.cells.get(idx))
    }

    pub fn subject_count(&self) -> usize {
        let mut count = 0;
        let mut previous: Option<&SubjectId> = None;
        for record in &self.records {
            if previous != Some(&record.subject) {
                count += 1;
                previous = Some(&record.subject);
            }
        }
        count
    }

    /// Latest representative date in the table.
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(PanelRecord::date).max()
    }

    /// A new table with `columns` appended, each record extended with the
    /// cells `cells_for` returns for it.
    ///
    /// Fails if a new column name is already present.
    pub fn extend<F>(self, step: &str, columns: Vec<ColumnSpec>, mut cells_for: F) -> Result<Self>
    where
        F: FnMut(&PanelRecord) -> Vec<Cell>,
    {
        for (idx, column) in columns.iter().enumerate() {
            let clash = self.column_index(&column.name).is_some()
                || columns[..idx].iter().any(|c| c.name == column.name);
            if clash {
                return Err(PanelError::DuplicateColumn {
                    column: column.name.clone(),
                    step: step.to_string(),
                });
            }
        }

        let width = columns.len();
        let records = self
            .records
            .into_iter()
            .map(|mut record| {
                let mut added = cells_for(&record);
                added.resize(width, Cell::Null);
                record.cells.extend(added);
                record
            })
            .collect();

        let mut all_columns = self.columns;
        all_columns.extend(columns);
        Ok(Self {
            granularity: self.granularity,
            columns: all_columns,
            records,
        })
    }

    /// A new table keeping only the records `keep` accepts.
    pub fn filter<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&PanelRecord) -> bool,
    {
        Self {
            granularity: self.granularity,
            columns: self.columns,
            records: self.records.into_iter().filter(|r| keep(r)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::GridRow;
    use acb_model::SubjectProfile;
    use std::collections::BTreeMap;

    fn grid() -> PanelGrid {
        let subject = SubjectId::new("7").unwrap();
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let period = Granularity::Month.period_of(start);
        let mut profiles = BTreeMap::new();
        profiles.insert(
            subject.clone(),
            SubjectProfile {
                data_provider: Some(3.0),
                time_in_sample: None,
            },
        );
        PanelGrid {
            granularity: Granularity::Month,
            columns: vec!["aa_1".to_string()],
            rows: vec![GridRow {
                subject,
                period,
                count: 2,
                sums: vec![1.5],
            }],
            profiles,
        }
    }

    #[test]
    fn base_columns_follow_the_grid() {
        let panel = EnrichedPanel::from_grid(&grid());
        let names: Vec<&str> = panel.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["date", "meds_count", "aa_1", "data_provider", "time_in_sample"]
        );
        let record = &panel.records()[0];
        assert_eq!(panel.cell(record, "meds_count"), Some(&Cell::Count(2)));
        assert_eq!(panel.cell(record, "data_provider"), Some(&Cell::Number(3.0)));
        assert_eq!(panel.cell(record, "time_in_sample"), Some(&Cell::Null));
    }

    #[test]
    fn extend_rejects_existing_column() {
        let panel = EnrichedPanel::from_grid(&grid());
        let err = panel
            .extend("bmi", vec![ColumnSpec::new("aa_1", ColumnKind::Number)], |_| {
                vec![Cell::Null]
            })
            .unwrap_err();
        assert!(matches!(err, PanelError::DuplicateColumn { ref step, .. } if step == "bmi"));
    }

    #[test]
    fn extend_pads_short_cell_lists() {
        let panel = EnrichedPanel::from_grid(&grid())
            .extend(
                "pair",
                vec![
                    ColumnSpec::new("a", ColumnKind::Text),
                    ColumnSpec::new("b", ColumnKind::Text),
                ],
                |_| vec![Cell::text(Some("x"))],
            )
            .unwrap();
        let record = &panel.records()[0];
        assert_eq!(panel.cell(record, "a"), Some(&Cell::Text("x".to_string())));
        assert_eq!(panel.cell(record, "b"), Some(&Cell::Null));
    }
}
