//! Period aggregation of the event stream.
//!
//! Events are bucketed by `(subject, period)`. Each bucket counts its events
//! and sums the configured indicator columns. Every subject then gets one row
//! for each period from its first to its last observed period, with empty
//! periods zero-filled.

use std::collections::BTreeMap;

use acb_common::{median, round_half_even};
use acb_model::{EventTable, Granularity, Period, SubjectId, SubjectProfile};
use tracing::debug;

use crate::error::{PanelError, Result};

/// One `(subject, period)` row of the aggregated grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub subject: SubjectId,
    pub period: Period,
    /// Number of events in the period.
    pub count: u64,
    /// Column sums, aligned with [`PanelGrid::columns`].
    pub sums: Vec<f64>,
}

impl GridRow {
    fn empty(subject: SubjectId, period: Period, width: usize) -> Self {
        Self {
            subject,
            period,
            count: 0,
            sums: vec![0.0; width],
        }
    }
}

/// The gap-free subject by period grid, sorted by subject then period.
#[derive(Debug, Clone)]
pub struct PanelGrid {
    pub granularity: Granularity,
    pub columns: Vec<String>,
    pub rows: Vec<GridRow>,
    pub profiles: BTreeMap<SubjectId, SubjectProfile>,
}

impl PanelGrid {
    pub fn subject_count(&self) -> usize {
        self.profiles.len()
    }
}

/// Aggregate `events` at `granularity`, summing `columns`.
///
/// Every entry of `columns` must be a column of the event table.
pub fn aggregate(
    events: &EventTable,
    granularity: Granularity,
    columns: &[String],
) -> Result<PanelGrid> {
    let indices = columns
        .iter()
        .map(|name| {
            events
                .column_index(name)
                .ok_or_else(|| PanelError::UnknownColumn {
                    column: name.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut buckets: BTreeMap<SubjectId, BTreeMap<Period, GridRow>> = BTreeMap::new();
    for event in events.events() {
        let period = granularity.period_of(event.date);
        let row = buckets
            .entry(event.subject.clone())
            .or_default()
            .entry(period)
            .or_insert_with(|| GridRow::empty(event.subject.clone(), period, indices.len()));
        row.count += 1;
        for (sum, &idx) in row.sums.iter_mut().zip(&indices) {
            if let Some(value) = event.values[idx] {
                *sum += value;
            }
        }
    }

    let mut rows = Vec::new();
    let mut gap_rows = 0usize;
    for (subject, mut observed) in buckets {
        let (Some((&first, _)), Some((&last, _))) =
            (observed.first_key_value(), observed.last_key_value())
        else {
            continue;
        };
        for period in first.through(last) {
            match observed.remove(&period) {
                Some(row) => rows.push(row),
                None => {
                    gap_rows += 1;
                    rows.push(GridRow::empty(subject.clone(), period, indices.len()));
                }
            }
        }
    }

    let profiles = subject_profiles(events);
    debug!(
        granularity = %granularity,
        rows = rows.len(),
        gap_rows,
        subjects = profiles.len(),
        "events aggregated"
    );
    Ok(PanelGrid {
        granularity,
        columns: columns.to_vec(),
        rows,
        profiles,
    })
}

/// Per-subject medians of the provider code and time in sample.
pub fn subject_profiles(events: &EventTable) -> BTreeMap<SubjectId, SubjectProfile> {
    let mut samples: BTreeMap<&SubjectId, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for event in events.events() {
        let (providers, times) = samples.entry(&event.subject).or_default();
        providers.extend(event.data_provider);
        times.extend(event.time_in_sample);
    }
    samples
        .into_iter()
        .map(|(subject, (providers, times))| {
            let profile = SubjectProfile {
                data_provider: median(providers).map(round_half_even),
                time_in_sample: median(times),
            };
            (subject.clone(), profile)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use acb_model::Event;
    use chrono::NaiveDate;

    fn event(subject: &str, on: (i32, u32, u32), provider: f64, values: Vec<Option<f64>>) -> Event {
        Event {
            subject: SubjectId::new(subject).unwrap(),
            date: NaiveDate::from_ymd_opt(on.0, on.1, on.2).unwrap(),
            data_provider: Some(provider),
            time_in_sample: Some(10.0),
            values,
        }
    }

    fn table(events: Vec<Event>) -> EventTable {
        let mut table = EventTable::new(vec!["aa_1".to_string(), "aa_2".to_string()]);
        for e in events {
            table.push(e).unwrap();
        }
        table
    }

    #[test]
    fn sums_selected_columns_and_counts_events() {
        let events = table(vec![
            event("1", (2015, 1, 3), 1.0, vec![Some(1.0), Some(2.0)]),
            event("1", (2015, 1, 28), 1.0, vec![None, Some(0.5)]),
        ]);
        let grid = aggregate(&events, Granularity::Month, &["aa_2".to_string()]).unwrap();
        assert_eq!(grid.rows.len(), 1);
        assert_eq!(grid.rows[0].count, 2);
        assert_eq!(grid.rows[0].sums, vec![2.5]);
    }

    #[test]
    fn unknown_column_is_an_error() {
        let events = table(vec![]);
        let err = aggregate(&events, Granularity::Year, &["aa_9".to_string()]).unwrap_err();
        assert!(matches!(err, PanelError::UnknownColumn { ref column } if column == "aa_9"));
    }

    #[test]
    fn provider_median_rounds_half_to_even() {
        let events = table(vec![
            event("1", (2015, 1, 3), 2.0, vec![None, None]),
            event("1", (2015, 2, 3), 3.0, vec![None, None]),
            event("2", (2015, 1, 3), 3.0, vec![None, None]),
            event("2", (2015, 1, 4), 4.0, vec![None, None]),
        ]);
        let profiles = subject_profiles(&events);
        // 2.5 rounds to 2, 3.5 rounds to 4.
        assert_eq!(profiles[&SubjectId::new("1").unwrap()].data_provider, Some(2.0));
        assert_eq!(profiles[&SubjectId::new("2").unwrap()].data_provider, Some(4.0));
        assert_eq!(profiles[&SubjectId::new("2").unwrap()].time_in_sample, Some(10.0));
    }
}
