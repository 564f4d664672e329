//! Data model for the anticholinergic burden panel pipeline.
//!
//! The types here are shared by ingestion, the panel engine and output:
//!
//! - **ids**: subject identifiers
//! - **period**: calendar granularity and period keys
//! - **event**: prescription events and their numeric indicator columns
//! - **subject**: static per-subject attributes
//! - **visit**: assessment visits and visit-dated covariate series
//! - **presence**: per-subject presence windows used for censoring

pub mod error;
pub mod event;
pub mod ids;
pub mod period;
pub mod presence;
pub mod subject;
pub mod visit;

pub use error::{ModelError, Result};
pub use event::{Event, EventTable};
pub use ids::SubjectId;
pub use period::{Granularity, Period};
pub use presence::PresenceWindow;
pub use subject::{Demographics, SubjectProfile};
pub use visit::{Measurement, VISIT_COUNT, Visit, VisitDates, VisitSeries};
