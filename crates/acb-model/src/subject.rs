//! Static, per-subject attributes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Demographic attributes joined onto every panel row of a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub sex: Option<String>,
    /// Day 1 of the birth month; `None` when year or month was unusable.
    pub birth_date: Option<NaiveDate>,
}

/// Attributes derived from a subject's own events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectProfile {
    /// Median provider code across the subject's events, rounded half to even.
    pub data_provider: Option<f64>,
    /// Median time-in-sample across the subject's events.
    pub time_in_sample: Option<f64>,
}
