//! Panel engine for the anticholinergic burden study.
//!
//! Turns the prescription event stream into a subject by period panel:
//!
//! - [`aggregate`]: gap-free period grid with per-period counts and sums
//! - [`resolver`]: which visit's covariate value applies at a date
//! - [`join`]: the ordered assembly steps that enrich each row
//! - [`censor`]: truncation to each subject's presence window
//! - [`pipeline`]: the stages wired together from a [`PipelineConfig`]

pub mod aggregate;
pub mod censor;
pub mod config;
pub mod covariates;
pub mod error;
pub mod join;
pub mod panel;
pub mod pipeline;
pub mod presence;
pub mod resolver;

pub use aggregate::{GridRow, PanelGrid, aggregate, subject_profiles};
pub use censor::{AbsentWindowPolicy, CensorOutcome, censor};
pub use config::{AggregationColumns, CovariateSource, InputFiles, PipelineConfig};
pub use covariates::{CovariateTable, Derivation, normalize_series};
pub use error::{PanelError, Result};
pub use join::{
    AssemblyStep, CovariateStep, DAYS_PER_YEAR, DemographicsStep, StaticStep, VisitDatesStep,
    age_in_years, assemble,
};
pub use panel::{Cell, ColumnKind, ColumnSpec, EnrichedPanel, PanelRecord};
pub use pipeline::{JoinSource, PanelInputs, PanelRun, build_panel, ingest, presence_windows};
pub use presence::{PresenceDerivation, derive_windows};
pub use resolver::{MissingVisitPolicy, Resolution, resolve};
