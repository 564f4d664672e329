//! Panel pipeline with explicit stages.
//!
//! 1. **Ingest**: load events, subject tables, covariates and presence windows
//! 2. **Aggregate**: bucket events into the gap-free subject by period grid
//! 3. **Assemble**: fold the join steps over the grid
//! 4. **Censor**: keep rows inside each subject's presence window
//!
//! Nothing is written here; callers write the returned panels only after
//! every stage has succeeded for every granularity.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use acb_ingest::{
    CsvOptions, EventLoad, StaticTable, load_demographics, load_events, load_mortality,
    load_prescription_log, load_presence_table, load_static_table, load_visit_answers,
    load_visit_dates, load_visit_series,
};
use acb_model::{Demographics, Granularity, PresenceWindow, SubjectId, VisitDates};
use chrono::NaiveDate;
use tracing::{debug, info, info_span};

use crate::aggregate::aggregate;
use crate::censor::censor;
use crate::config::{CovariateSource, PipelineConfig};
use crate::covariates::CovariateTable;
use crate::error::{PanelError, Result};
use crate::join::{AssemblyStep, CovariateStep, DemographicsStep, StaticStep, VisitDatesStep, assemble};
use crate::panel::EnrichedPanel;
use crate::presence::{PresenceDerivation, derive_windows};

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// A covariate source after loading.
#[derive(Debug, Clone)]
pub enum JoinSource {
    Resolved(CovariateTable),
    Static { name: String, table: StaticTable },
}

/// Every input the panel stages need, loaded and validated.
#[derive(Debug, Clone)]
pub struct PanelInputs {
    pub events: EventLoad,
    pub demographics: BTreeMap<SubjectId, Demographics>,
    pub visit_dates: BTreeMap<SubjectId, VisitDates>,
    pub covariates: Vec<JoinSource>,
    pub windows: BTreeMap<SubjectId, PresenceWindow>,
}

/// Load every input table. Any structural problem aborts the run.
///
/// Only the aggregation columns of `granularities` are required in the
/// event table.
pub fn ingest(config: &PipelineConfig, granularities: &[Granularity]) -> Result<PanelInputs> {
    let span = info_span!("ingest", data_dir = %config.data_dir.display());
    let _guard = span.enter();
    let start = Instant::now();
    let plain = CsvOptions::default();

    let events_path = config.input_path(&config.inputs.events);
    let events = load_events(
        &events_path,
        &config.inputs.events_format,
        &config.event_columns(granularities),
        &config.placeholder_dates,
    )?;
    if events.table.is_empty() {
        return Err(PanelError::EmptyEvents { path: events_path });
    }

    let demographics =
        load_demographics(&config.input_path(&config.inputs.demographics), &plain)?;
    let visit_dates = load_visit_dates(&config.input_path(&config.inputs.visit_dates), &plain)?;

    let mut covariates = Vec::with_capacity(config.covariates.len());
    for source in &config.covariates {
        let path = config.input_path(source.file());
        let loaded = match source {
            CovariateSource::Series {
                name,
                stem,
                non_answer_codes,
                ..
            } => {
                let raw = load_visit_series(&path, &plain, stem)?;
                JoinSource::Resolved(CovariateTable::from_series(
                    name.as_str(),
                    &raw,
                    non_answer_codes,
                ))
            }
            CovariateSource::Derived {
                name, derivation, ..
            } => {
                let answers = load_visit_answers(&path, &plain)?;
                JoinSource::Resolved(CovariateTable::from_answers(
                    name.as_str(),
                    &answers,
                    *derivation,
                ))
            }
            CovariateSource::Static { file } => JoinSource::Static {
                name: file_stem(file),
                table: load_static_table(&path, &plain)?,
            },
        };
        covariates.push(loaded);
    }

    let windows = match &config.inputs.presence {
        Some(file) => load_presence_table(&config.input_path(file), &plain)?,
        None => presence_windows(config)?.windows,
    };

    info!(
        events = events.table.len(),
        excluded_events = events.dropped(),
        subjects = demographics.len(),
        covariates = covariates.len(),
        windows = windows.len(),
        duration_ms = start.elapsed().as_millis(),
        "inputs loaded"
    );
    Ok(PanelInputs {
        events,
        demographics,
        visit_dates,
        covariates,
        windows,
    })
}

/// Derive presence windows from the raw prescription log and mortality table.
pub fn presence_windows(config: &PipelineConfig) -> Result<PresenceDerivation> {
    let span = info_span!("presence");
    let _guard = span.enter();
    let start = Instant::now();

    let log = load_prescription_log(
        &config.input_path(&config.inputs.prescription_log),
        &config.inputs.prescription_log_format,
        &config.inputs.prescription_log_date_format,
    )?;
    let deaths = load_mortality(
        &config.input_path(&config.inputs.mortality),
        &CsvOptions::default(),
        &config.death_column,
    )?;
    let derived = derive_windows(&log, &deaths, &config.placeholder_dates);
    debug!(
        log_entries = log.len(),
        subjects = derived.windows.len(),
        duration_ms = start.elapsed().as_millis(),
        "presence stage complete"
    );
    Ok(derived)
}

fn file_stem(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

// ============================================================================
// Stages 2-4: Aggregate, Assemble, Censor
// ============================================================================

/// A censored panel and the counts behind it.
#[derive(Debug, Clone)]
pub struct PanelRun {
    pub granularity: Granularity,
    pub panel: EnrichedPanel,
    /// Rows in the grid before censoring.
    pub grid_rows: usize,
    pub sentinel: Option<NaiveDate>,
    pub outside_window: usize,
    pub without_window: usize,
}

/// Run aggregation, assembly and censoring for one granularity.
pub fn build_panel(
    inputs: &PanelInputs,
    config: &PipelineConfig,
    granularity: Granularity,
) -> Result<PanelRun> {
    let columns = config.aggregation.columns(granularity);

    let grid = info_span!("aggregate", %granularity).in_scope(|| -> Result<_> {
        let start = Instant::now();
        let grid = aggregate(&inputs.events.table, granularity, columns)?;
        debug!(
            rows = grid.rows.len(),
            subjects = grid.subject_count(),
            duration_ms = start.elapsed().as_millis(),
            "aggregate stage complete"
        );
        Ok(grid)
    })?;

    let panel = info_span!("assemble", %granularity).in_scope(|| -> Result<_> {
        let start = Instant::now();
        let demographics = DemographicsStep::new(&inputs.demographics);
        let visit_dates = VisitDatesStep::new(&inputs.visit_dates);
        let mut covariate_steps: Vec<Box<dyn AssemblyStep + '_>> =
            Vec::with_capacity(inputs.covariates.len());
        for source in &inputs.covariates {
            match source {
                JoinSource::Resolved(table) => covariate_steps.push(Box::new(CovariateStep::new(
                    table,
                    &inputs.visit_dates,
                    config.missing_visit_policy,
                ))),
                JoinSource::Static { name, table } => {
                    covariate_steps.push(Box::new(StaticStep::new(name.as_str(), table)));
                }
            }
        }

        let mut steps: Vec<&dyn AssemblyStep> = vec![&demographics, &visit_dates];
        steps.extend(covariate_steps.iter().map(|step| step.as_ref()));
        let panel = assemble(&grid, &steps)?;
        debug!(
            rows = panel.len(),
            columns = panel.columns().len(),
            duration_ms = start.elapsed().as_millis(),
            "assemble stage complete"
        );
        Ok(panel)
    })?;

    let outcome = info_span!("censor", %granularity).in_scope(|| {
        let start = Instant::now();
        let outcome = censor(panel, &inputs.windows, config.absent_window_policy);
        debug!(
            rows = outcome.panel.len(),
            dropped = outcome.dropped(),
            duration_ms = start.elapsed().as_millis(),
            "censor stage complete"
        );
        outcome
    });

    info!(
        %granularity,
        rows = outcome.panel.len(),
        subjects = outcome.panel.subject_count(),
        censored = outcome.dropped(),
        "panel built"
    );
    Ok(PanelRun {
        granularity,
        grid_rows: grid.rows.len(),
        panel: outcome.panel,
        sentinel: outcome.sentinel,
        outside_window: outcome.outside_window,
        without_window: outcome.without_window,
    })
}
