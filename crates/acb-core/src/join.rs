//! Temporal join of subject attributes and covariates onto the panel.
//!
//! Assembly is a left fold over an ordered list of [`AssemblyStep`]s. Each
//! step appends its own columns and returns a new table, so the join order
//! is explicit and a column name clash stops the run instead of silently
//! overwriting data. Subjects missing from a step's source keep their rows
//! with null cells.

use std::collections::BTreeMap;

use acb_ingest::StaticTable;
use acb_model::{Demographics, SubjectId, Visit, VisitDates};
use chrono::NaiveDate;
use tracing::debug;

use crate::aggregate::PanelGrid;
use crate::covariates::CovariateTable;
use crate::error::Result;
use crate::panel::{Cell, ColumnKind, ColumnSpec, EnrichedPanel};
use crate::resolver::{MissingVisitPolicy, Resolution, resolve};

/// Average length of a year in days.
pub const DAYS_PER_YEAR: f64 = 365.242;

/// Age in years at `at` for someone born on `birth`: elapsed days over
/// [`DAYS_PER_YEAR`].
pub fn age_in_years(birth: NaiveDate, at: NaiveDate) -> f64 {
    (at - birth).num_days() as f64 / DAYS_PER_YEAR
}

/// One join applied to every panel row.
pub trait AssemblyStep {
    /// Name used in logs and errors.
    fn step_name(&self) -> &str;

    /// Columns this step appends.
    fn columns(&self) -> Vec<ColumnSpec>;

    /// Cells for one row, aligned with [`AssemblyStep::columns`].
    fn cells(&self, subject: &SubjectId, date: NaiveDate) -> Vec<Cell>;
}

/// Sex, birth date and age at the row's representative date.
pub struct DemographicsStep<'a> {
    demographics: &'a BTreeMap<SubjectId, Demographics>,
}

impl<'a> DemographicsStep<'a> {
    pub fn new(demographics: &'a BTreeMap<SubjectId, Demographics>) -> Self {
        Self { demographics }
    }
}

impl AssemblyStep for DemographicsStep<'_> {
    fn step_name(&self) -> &str {
        "demographics"
    }

    fn columns(&self) -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("sex", ColumnKind::Text),
            ColumnSpec::new("birth_date", ColumnKind::Date),
            ColumnSpec::new("med_age", ColumnKind::Number),
        ]
    }

    fn cells(&self, subject: &SubjectId, date: NaiveDate) -> Vec<Cell> {
        let Some(demo) = self.demographics.get(subject) else {
            return Vec::new();
        };
        vec![
            Cell::text(demo.sex.as_deref()),
            Cell::date(demo.birth_date),
            Cell::number(demo.birth_date.map(|birth| age_in_years(birth, date))),
        ]
    }
}

/// The three assessment dates, as `date_1..3`.
pub struct VisitDatesStep<'a> {
    dates: &'a BTreeMap<SubjectId, VisitDates>,
}

impl<'a> VisitDatesStep<'a> {
    pub fn new(dates: &'a BTreeMap<SubjectId, VisitDates>) -> Self {
        Self { dates }
    }
}

impl AssemblyStep for VisitDatesStep<'_> {
    fn step_name(&self) -> &str {
        "visit dates"
    }

    fn columns(&self) -> Vec<ColumnSpec> {
        Visit::ALL
            .iter()
            .map(|visit| ColumnSpec::new(format!("date_{}", visit.number()), ColumnKind::Date))
            .collect()
    }

    fn cells(&self, subject: &SubjectId, _date: NaiveDate) -> Vec<Cell> {
        self.dates
            .get(subject)
            .map(|dates| dates.as_array().iter().copied().map(Cell::date).collect())
            .unwrap_or_default()
    }
}

/// A visit-dated covariate resolved at the row's representative date.
pub struct CovariateStep<'a> {
    table: &'a CovariateTable,
    dates: &'a BTreeMap<SubjectId, VisitDates>,
    policy: MissingVisitPolicy,
}

impl<'a> CovariateStep<'a> {
    pub fn new(
        table: &'a CovariateTable,
        dates: &'a BTreeMap<SubjectId, VisitDates>,
        policy: MissingVisitPolicy,
    ) -> Self {
        Self {
            table,
            dates,
            policy,
        }
    }

    pub fn resolve(&self, subject: &SubjectId, date: NaiveDate) -> Resolution<'a> {
        let Some(series) = self.table.get(subject) else {
            return Resolution::Unlinked;
        };
        let dates = self.dates.get(subject).copied().unwrap_or_default();
        resolve(&series.measurements(&dates), date, self.policy)
    }
}

impl AssemblyStep for CovariateStep<'_> {
    fn step_name(&self) -> &str {
        &self.table.name
    }

    fn columns(&self) -> Vec<ColumnSpec> {
        vec![ColumnSpec::new(self.table.name.as_str(), ColumnKind::Text)]
    }

    fn cells(&self, subject: &SubjectId, date: NaiveDate) -> Vec<Cell> {
        vec![Cell::text(self.resolve(subject, date).value())]
    }
}

/// Subject-level columns copied onto every row unchanged.
pub struct StaticStep<'a> {
    name: String,
    table: &'a StaticTable,
}

impl<'a> StaticStep<'a> {
    pub fn new(name: impl Into<String>, table: &'a StaticTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }
}

impl AssemblyStep for StaticStep<'_> {
    fn step_name(&self) -> &str {
        &self.name
    }

    fn columns(&self) -> Vec<ColumnSpec> {
        self.table
            .columns
            .iter()
            .map(|name| ColumnSpec::new(name.as_str(), ColumnKind::Text))
            .collect()
    }

    fn cells(&self, subject: &SubjectId, _date: NaiveDate) -> Vec<Cell> {
        self.table
            .get(subject)
            .map(|values| values.iter().map(|v| Cell::text(v.as_deref())).collect())
            .unwrap_or_default()
    }
}

/// Build the enriched panel from the grid by applying `steps` in order.
pub fn assemble(grid: &PanelGrid, steps: &[&dyn AssemblyStep]) -> Result<EnrichedPanel> {
    steps
        .iter()
        .try_fold(EnrichedPanel::from_grid(grid), |panel, step| {
            let panel = panel.extend(step.step_name(), step.columns(), |record| {
                step.cells(&record.subject, record.date())
            })?;
            debug!(step = step.step_name(), columns = panel.columns().len(), "step joined");
            Ok(panel)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use acb_model::VisitSeries;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_uses_average_year_length() {
        let birth = date(1950, 3, 1);
        let age = age_in_years(birth, date(2015, 3, 1));
        let days = (date(2015, 3, 1) - birth).num_days() as f64;
        assert!((age - days / 365.242).abs() < 1e-12);
        assert!(age < 65.0 + 1e-2 && age > 64.99);
    }

    #[test]
    fn covariate_step_tags_unlinked_subjects() {
        let subject = SubjectId::new("1").unwrap();
        let mut series = BTreeMap::new();
        series.insert(
            subject.clone(),
            VisitSeries::new([Some("0".to_string()), None, None]),
        );
        let table = CovariateTable {
            name: "smoking".to_string(),
            series,
        };
        let dates = BTreeMap::new();
        let step = CovariateStep::new(&table, &dates, MissingVisitPolicy::Blank);

        assert_eq!(step.resolve(&subject, date(2015, 1, 1)).value(), Some("0"));
        let other = SubjectId::new("2").unwrap();
        assert_eq!(step.resolve(&other, date(2015, 1, 1)), Resolution::Unlinked);
        assert_eq!(step.cells(&other, date(2015, 1, 1)), vec![Cell::Null]);
    }
}
