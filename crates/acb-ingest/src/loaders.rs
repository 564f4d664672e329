//! Typed loaders, one per input table.
//!
//! Each loader reads its file with [`read_csv_table`], checks the columns it
//! needs, and converts cells into model types. Missing columns are fatal;
//! unusable cells become `None` or drop the row, and such drops are counted
//! or logged, never raised.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use acb_common::{parse_date, parse_f64, parse_iso_date};
use acb_model::{
    Demographics, Event, EventTable, PresenceWindow, SubjectId, VISIT_COUNT, Visit, VisitDates,
    VisitSeries,
};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::csv::{CsvOptions, CsvTable, read_csv_table};
use crate::error::{IngestError, Result};
use crate::tables::{EventLoad, LogEntry, StaticTable, VisitAnswers};

/// Subject id column shared by every input table.
pub const ID_COLUMN: &str = "id";
pub const DATE_COLUMN: &str = "date";
pub const DATA_PROVIDER_COLUMN: &str = "data_provider";
pub const TIME_IN_SAMPLE_COLUMN: &str = "time_in_sample";

fn subject_of(table: &CsvTable, row: &[String], id_idx: usize) -> Option<SubjectId> {
    table
        .value(row, id_idx)
        .and_then(|raw| SubjectId::new(raw).ok())
}

/// Load the prescription events with the given numeric indicator columns.
///
/// Rows dated on a placeholder date, with an unusable date, or without an id
/// are dropped and counted in the returned [`EventLoad`].
pub fn load_events(
    path: &Path,
    options: &CsvOptions,
    value_columns: &[String],
    placeholder_dates: &[NaiveDate],
) -> Result<EventLoad> {
    let table = read_csv_table(path, options)?;
    let id_idx = table.require_column(ID_COLUMN)?;
    let date_idx = table.require_column(DATE_COLUMN)?;
    let provider_idx = table.require_column(DATA_PROVIDER_COLUMN)?;
    let time_idx = table.require_column(TIME_IN_SAMPLE_COLUMN)?;
    let value_idx = value_columns
        .iter()
        .map(|name| table.require_column(name))
        .collect::<Result<Vec<_>>>()?;

    let mut load = EventLoad {
        table: EventTable::new(value_columns.to_vec()),
        ..EventLoad::default()
    };
    for row in &table.rows {
        let Some(subject) = subject_of(&table, row, id_idx) else {
            load.missing_ids += 1;
            continue;
        };
        let Some(date) = table.value(row, date_idx).and_then(parse_iso_date) else {
            load.unparsable_dates += 1;
            continue;
        };
        if placeholder_dates.contains(&date) {
            load.placeholder_dates += 1;
            continue;
        }
        let values = value_idx
            .iter()
            .map(|&idx| table.value(row, idx).and_then(parse_f64))
            .collect();
        load.table
            .push(Event {
                subject,
                date,
                data_provider: table.value(row, provider_idx).and_then(parse_f64),
                time_in_sample: table.value(row, time_idx).and_then(parse_f64),
                values,
            })
            .map_err(|e| IngestError::CsvParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
    }

    if load.dropped() > 0 {
        warn!(
            path = %path.display(),
            placeholder_dates = load.placeholder_dates,
            unparsable_dates = load.unparsable_dates,
            missing_ids = load.missing_ids,
            "event rows excluded"
        );
    }
    debug!(path = %path.display(), events = load.table.len(), "events loaded");
    Ok(load)
}

/// Whole number from a cell such as `7`, `07` or `7.0`.
fn parse_whole(value: &str) -> Option<i64> {
    let number = parse_f64(value)?;
    (number.fract() == 0.0).then_some(number as i64)
}

/// Birth date on day 1 of the birth month.
///
/// Years and months may be written with or without padding (`3`, `03`,
/// `3.0`); anything that does not form a real calendar month yields `None`.
pub fn birth_date(year: Option<&str>, month: Option<&str>) -> Option<NaiveDate> {
    let year = i32::try_from(parse_whole(year?)?).ok()?;
    let month = u32::try_from(parse_whole(month?)?).ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Load sex and birth date per subject. The first row of a subject wins.
pub fn load_demographics(
    path: &Path,
    options: &CsvOptions,
) -> Result<BTreeMap<SubjectId, Demographics>> {
    let table = read_csv_table(path, options)?;
    let id_idx = table.require_column(ID_COLUMN)?;
    let year_idx = table.require_column("birth_year")?;
    let month_idx = table.require_column("birth_month")?;
    let sex_idx = table.require_column("sex")?;

    let mut out = BTreeMap::new();
    let mut unusable_birth_dates = 0usize;
    for row in &table.rows {
        let Some(subject) = subject_of(&table, row, id_idx) else {
            continue;
        };
        let Entry::Vacant(slot) = out.entry(subject) else {
            continue;
        };
        let birth = birth_date(table.value(row, year_idx), table.value(row, month_idx));
        if birth.is_none() {
            unusable_birth_dates += 1;
        }
        slot.insert(Demographics {
            sex: table.value(row, sex_idx).map(str::to_string),
            birth_date: birth,
        });
    }
    if unusable_birth_dates > 0 {
        warn!(
            path = %path.display(),
            count = unusable_birth_dates,
            "subjects without a usable birth date; age will be empty"
        );
    }
    Ok(out)
}

/// Load the three assessment dates per subject.
///
/// The date columns are taken positionally: the first three columns after
/// `id`, whatever their names.
pub fn load_visit_dates(path: &Path, options: &CsvOptions) -> Result<BTreeMap<SubjectId, VisitDates>> {
    let table = read_csv_table(path, options)?;
    let id_idx = table.require_column(ID_COLUMN)?;
    let date_cols: Vec<usize> = (0..table.headers.len())
        .filter(|&idx| idx != id_idx)
        .take(VISIT_COUNT)
        .collect();
    if date_cols.len() < VISIT_COUNT {
        return Err(IngestError::TooFewColumns {
            kind: "visit date",
            expected: VISIT_COUNT,
            found: date_cols.len(),
            path: path.to_path_buf(),
        });
    }

    let mut out = BTreeMap::new();
    for row in &table.rows {
        let Some(subject) = subject_of(&table, row, id_idx) else {
            continue;
        };
        let dates = VisitDates::new(Visit::ALL.map(|visit| {
            table
                .value(row, date_cols[visit.index()])
                .and_then(parse_iso_date)
        }));
        out.entry(subject).or_insert(dates);
    }
    Ok(out)
}

/// Load a covariate recorded once per visit in `<stem>_1`, `<stem>_2`, `<stem>_3`.
///
/// Values are kept as raw text; non-answer codes are handled by the caller.
pub fn load_visit_series(
    path: &Path,
    options: &CsvOptions,
    stem: &str,
) -> Result<BTreeMap<SubjectId, VisitSeries>> {
    let table = read_csv_table(path, options)?;
    let id_idx = table.require_column(ID_COLUMN)?;
    let mut cols = [0usize; VISIT_COUNT];
    for visit in Visit::ALL {
        cols[visit.index()] = table.require_column(&format!("{stem}_{}", visit.number()))?;
    }

    let mut out = BTreeMap::new();
    for row in &table.rows {
        let Some(subject) = subject_of(&table, row, id_idx) else {
            continue;
        };
        let series = VisitSeries::new(
            Visit::ALL.map(|visit| table.value(row, cols[visit.index()]).map(str::to_string)),
        );
        out.entry(subject).or_insert(series);
    }
    Ok(out)
}

/// Load a multi-part question whose columns are grouped by visit prefix
/// (`first_1 .. first_5`, `second_1 ..`, `third_0 ..`).
///
/// Columns without a visit prefix are ignored. Every visit needs at least
/// one column.
pub fn load_visit_answers(
    path: &Path,
    options: &CsvOptions,
) -> Result<BTreeMap<SubjectId, VisitAnswers>> {
    let table = read_csv_table(path, options)?;
    let id_idx = table.require_column(ID_COLUMN)?;
    let groups: [Vec<usize>; VISIT_COUNT] = Visit::ALL.map(|visit| {
        let prefix = format!("{}_", visit.prefix());
        table
            .headers
            .iter()
            .enumerate()
            .filter(|(_, header)| header.starts_with(&prefix))
            .map(|(idx, _)| idx)
            .collect()
    });
    for visit in Visit::ALL {
        if groups[visit.index()].is_empty() {
            return Err(IngestError::missing_column(
                format!("{}_*", visit.prefix()),
                path,
            ));
        }
    }

    let mut out = BTreeMap::new();
    for row in &table.rows {
        let Some(subject) = subject_of(&table, row, id_idx) else {
            continue;
        };
        let answers = VisitAnswers::new(Visit::ALL.map(|visit| {
            groups[visit.index()]
                .iter()
                .filter_map(|&idx| table.value(row, idx).map(str::to_string))
                .collect()
        }));
        out.entry(subject).or_insert(answers);
    }
    Ok(out)
}

/// Load every non-id column of a subject-level table as text.
pub fn load_static_table(path: &Path, options: &CsvOptions) -> Result<StaticTable> {
    let table = read_csv_table(path, options)?;
    let id_idx = table.require_column(ID_COLUMN)?;
    let cols: Vec<usize> = (0..table.headers.len()).filter(|&idx| idx != id_idx).collect();

    let mut rows = BTreeMap::new();
    for row in &table.rows {
        let Some(subject) = subject_of(&table, row, id_idx) else {
            continue;
        };
        let values = cols
            .iter()
            .map(|&idx| table.value(row, idx).map(str::to_string))
            .collect();
        rows.entry(subject).or_insert(values);
    }
    Ok(StaticTable {
        columns: cols.iter().map(|&idx| table.headers[idx].clone()).collect(),
        rows,
    })
}

/// Load precomputed presence windows (`id, date_first, date_death`).
///
/// Subjects whose `date_first` is unusable get no window.
pub fn load_presence_table(
    path: &Path,
    options: &CsvOptions,
) -> Result<BTreeMap<SubjectId, PresenceWindow>> {
    let table = read_csv_table(path, options)?;
    let id_idx = table.require_column(ID_COLUMN)?;
    let first_idx = table.require_column("date_first")?;
    let death_idx = table.require_column("date_death")?;

    let mut out = BTreeMap::new();
    let mut skipped = 0usize;
    for row in &table.rows {
        let Some(subject) = subject_of(&table, row, id_idx) else {
            continue;
        };
        let Some(first) = table.value(row, first_idx).and_then(parse_iso_date) else {
            skipped += 1;
            continue;
        };
        let death = table.value(row, death_idx).and_then(parse_iso_date);
        out.entry(subject)
            .or_insert(PresenceWindow::new(first, death));
    }
    if skipped > 0 {
        warn!(path = %path.display(), count = skipped, "presence rows without a first date");
    }
    Ok(out)
}

/// Load the raw prescription log (`id`, `date`) using `date_format` for dates.
pub fn load_prescription_log(
    path: &Path,
    options: &CsvOptions,
    date_format: &str,
) -> Result<Vec<LogEntry>> {
    let table = read_csv_table(path, options)?;
    let id_idx = table.require_column(ID_COLUMN)?;
    let date_idx = table.require_column(DATE_COLUMN)?;

    let entries: Vec<LogEntry> = table
        .rows
        .iter()
        .filter_map(|row| {
            let subject = subject_of(&table, row, id_idx)?;
            let date = table
                .value(row, date_idx)
                .and_then(|raw| parse_date(raw, date_format));
            Some(LogEntry { subject, date })
        })
        .collect();
    debug!(path = %path.display(), entries = entries.len(), "prescription log loaded");
    Ok(entries)
}

/// Load recorded death dates. A subject listed more than once keeps the
/// earliest date; rows without a usable date are not deaths.
pub fn load_mortality(
    path: &Path,
    options: &CsvOptions,
    death_column: &str,
) -> Result<BTreeMap<SubjectId, NaiveDate>> {
    let table = read_csv_table(path, options)?;
    let id_idx = table.require_column(ID_COLUMN)?;
    let death_idx = table.require_column(death_column)?;

    let mut out: BTreeMap<SubjectId, NaiveDate> = BTreeMap::new();
    for row in &table.rows {
        let Some(subject) = subject_of(&table, row, id_idx) else {
            continue;
        };
        let Some(death) = table.value(row, death_idx).and_then(parse_iso_date) else {
            continue;
        };
        out.entry(subject)
            .and_modify(|existing| *existing = (*existing).min(death))
            .or_insert(death);
    }
    Ok(out)
}
