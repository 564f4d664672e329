//! DataFrame construction from panel tables.

use std::collections::BTreeMap;

use acb_common::format_date;
use acb_core::{Cell, ColumnKind, ColumnSpec, EnrichedPanel};
use acb_model::{PresenceWindow, SubjectId};
use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::error::{OutputError, Result};

/// Name of the subject id column in every output table.
pub const ID_COLUMN: &str = "id";

fn column_from_cells<'a>(spec: &ColumnSpec, cells: impl Iterator<Item = &'a Cell>) -> Column {
    let name = spec.name.as_str().into();
    match spec.kind {
        ColumnKind::Count => {
            let values: Vec<Option<u64>> = cells
                .map(|cell| match cell {
                    Cell::Count(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name, values).into()
        }
        ColumnKind::Number => {
            let values: Vec<Option<f64>> = cells.map(Cell::as_f64).collect();
            Series::new(name, values).into()
        }
        ColumnKind::Text | ColumnKind::Date => {
            let values: Vec<Option<String>> = cells
                .map(|cell| match cell {
                    Cell::Text(v) => Some(v.clone()),
                    Cell::Date(d) => Some(format_date(*d)),
                    Cell::Count(v) => Some(v.to_string()),
                    Cell::Number(v) => Some(acb_common::format_numeric(*v)),
                    Cell::Null => None,
                })
                .collect();
            Series::new(name, values).into()
        }
    }
}

/// The panel as a DataFrame: `id`, the period label column, then the panel
/// columns in schema order.
pub fn panel_frame(panel: &EnrichedPanel) -> Result<DataFrame> {
    let records = panel.records();
    let period_column = panel.granularity().period_column();
    let mut columns: Vec<Column> = Vec::with_capacity(panel.columns().len() + 2);

    let ids: Vec<String> = records.iter().map(|r| r.subject.to_string()).collect();
    columns.push(Series::new(ID_COLUMN.into(), ids).into());
    let labels: Vec<String> = records.iter().map(|r| r.period.label()).collect();
    columns.push(Series::new(period_column.into(), labels).into());

    for (idx, spec) in panel.columns().iter().enumerate() {
        columns.push(column_from_cells(
            spec,
            records.iter().filter_map(move |r| r.cells.get(idx)),
        ));
    }

    DataFrame::new(columns).map_err(|source| OutputError::Frame {
        name: panel.granularity().output_stem().to_string(),
        source,
    })
}

/// Presence windows as `id, date_first, date_death`.
pub fn presence_frame(windows: &BTreeMap<SubjectId, PresenceWindow>) -> Result<DataFrame> {
    let ids: Vec<String> = windows.keys().map(ToString::to_string).collect();
    let first: Vec<String> = windows.values().map(|w| format_date(w.first)).collect();
    let death: Vec<Option<String>> = windows.values().map(|w| w.death.map(format_date)).collect();
    DataFrame::new(vec![
        Series::new(ID_COLUMN.into(), ids).into(),
        Series::new("date_first".into(), first).into(),
        Series::new("date_death".into(), death).into(),
    ])
    .map_err(|source| OutputError::Frame {
        name: "id_present".to_string(),
        source,
    })
}
