//! Assessment visits and visit-dated covariate values.
//!
//! Every subject has up to three assessment visits. The visit dates are
//! shared by all covariates, while each covariate table records its own value
//! per visit, any of which may be missing.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const VISIT_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Visit {
    First,
    Second,
    Third,
}

impl Visit {
    /// Visits in assessment order.
    pub const ALL: [Visit; VISIT_COUNT] = [Visit::First, Visit::Second, Visit::Third];

    /// Zero-based position.
    pub fn index(self) -> usize {
        match self {
            Visit::First => 0,
            Visit::Second => 1,
            Visit::Third => 2,
        }
    }

    /// One-based visit number used in column suffixes (`smoking_2`).
    pub fn number(self) -> usize {
        self.index() + 1
    }

    /// Column prefix of the per-visit sub-question columns (`first_3`).
    pub fn prefix(self) -> &'static str {
        match self {
            Visit::First => "first",
            Visit::Second => "second",
            Visit::Third => "third",
        }
    }
}

impl fmt::Display for Visit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visit {}", self.number())
    }
}

/// Assessment dates of one subject; `None` for a visit that never happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitDates([Option<NaiveDate>; VISIT_COUNT]);

impl VisitDates {
    pub fn new(dates: [Option<NaiveDate>; VISIT_COUNT]) -> Self {
        Self(dates)
    }

    pub fn get(&self, visit: Visit) -> Option<NaiveDate> {
        self.0[visit.index()]
    }

    pub fn as_array(&self) -> &[Option<NaiveDate>; VISIT_COUNT] {
        &self.0
    }
}

/// One covariate's values at each visit for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitSeries([Option<String>; VISIT_COUNT]);

impl VisitSeries {
    pub fn new(values: [Option<String>; VISIT_COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, visit: Visit) -> Option<&str> {
        self.0[visit.index()].as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Pair each value with its visit date, in visit order.
    pub fn measurements<'a>(&'a self, dates: &VisitDates) -> [Measurement<'a>; VISIT_COUNT] {
        Visit::ALL.map(|visit| Measurement {
            visit,
            date: dates.get(visit),
            value: self.get(visit),
        })
    }
}

/// A covariate value tagged with the visit and date it was measured at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement<'a> {
    pub visit: Visit,
    pub date: Option<NaiveDate>,
    pub value: Option<&'a str>,
}
