//! Covariate snapshot resolution.
//!
//! A covariate is measured at up to three visits. For a target date the
//! applicable value is chosen by folding over the visits in order: visit 1
//! is the default, and each later visit whose date is on or before the
//! target replaces it. Visits without a date never replace anything.

use acb_model::{Measurement, Visit};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What to do when a visit that applies to the target date has no value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingVisitPolicy {
    /// The missing value replaces the earlier one; the covariate is blank
    /// from that visit onwards.
    #[default]
    Blank,
    /// The last measured value stays in effect.
    CarryForward,
}

/// Outcome of resolving one covariate at one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The applicable visit recorded a value.
    Measured { visit: Visit, value: &'a str },
    /// The applicable visit exists but its value is missing or a non-answer.
    Unmeasured { visit: Visit },
    /// The subject has no record in the covariate table.
    Unlinked,
}

impl<'a> Resolution<'a> {
    pub fn value(&self) -> Option<&'a str> {
        match self {
            Resolution::Measured { value, .. } => Some(value),
            Resolution::Unmeasured { .. } | Resolution::Unlinked => None,
        }
    }

    pub fn visit(&self) -> Option<Visit> {
        match self {
            Resolution::Measured { visit, .. } | Resolution::Unmeasured { visit } => Some(*visit),
            Resolution::Unlinked => None,
        }
    }
}

fn outcome_of<'a>(measurement: &Measurement<'a>) -> Resolution<'a> {
    match measurement.value {
        Some(value) => Resolution::Measured {
            visit: measurement.visit,
            value,
        },
        None => Resolution::Unmeasured {
            visit: measurement.visit,
        },
    }
}

/// Resolve the value in effect at `target`.
///
/// `measurements` must be in visit order with non-answer codes already
/// removed. An empty slice resolves to [`Resolution::Unlinked`].
pub fn resolve<'a>(
    measurements: &[Measurement<'a>],
    target: NaiveDate,
    policy: MissingVisitPolicy,
) -> Resolution<'a> {
    let Some((first, later)) = measurements.split_first() else {
        return Resolution::Unlinked;
    };
    later
        .iter()
        .filter(|m| m.date.is_some_and(|date| target >= date))
        .fold(outcome_of(first), |current, m| match (outcome_of(m), policy) {
            (next @ Resolution::Measured { .. }, _) | (next, MissingVisitPolicy::Blank) => next,
            (next, MissingVisitPolicy::CarryForward) => match current {
                Resolution::Measured { .. } => current,
                _ => next,
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn m<'a>(visit: Visit, on: Option<NaiveDate>, value: Option<&'a str>) -> Measurement<'a> {
        Measurement {
            visit,
            date: on,
            value,
        }
    }

    #[test]
    fn missing_later_visit_blanks_the_value() {
        let ms = [
            m(Visit::First, Some(date(2010, 1, 1)), Some("current")),
            m(Visit::Second, Some(date(2015, 6, 1)), None),
            m(Visit::Third, None, None),
        ];
        let resolved = resolve(&ms, date(2016, 1, 1), MissingVisitPolicy::Blank);
        assert_eq!(resolved, Resolution::Unmeasured { visit: Visit::Second });
        assert_eq!(resolved.value(), None);
    }

    #[test]
    fn carry_forward_keeps_last_measured_value() {
        let ms = [
            m(Visit::First, Some(date(2010, 1, 1)), Some("current")),
            m(Visit::Second, Some(date(2015, 6, 1)), None),
        ];
        let resolved = resolve(&ms, date(2016, 1, 1), MissingVisitPolicy::CarryForward);
        assert_eq!(
            resolved,
            Resolution::Measured {
                visit: Visit::First,
                value: "current"
            }
        );
    }

    #[test]
    fn visit_one_applies_before_its_own_date() {
        let ms = [
            m(Visit::First, Some(date(2010, 1, 1)), Some("2")),
            m(Visit::Second, Some(date(2015, 6, 1)), Some("1")),
        ];
        assert_eq!(
            resolve(&ms, date(2001, 1, 1), MissingVisitPolicy::Blank).value(),
            Some("2")
        );
    }

    #[test]
    fn override_starts_on_the_visit_date() {
        let ms = [
            m(Visit::First, Some(date(2010, 1, 1)), Some("2")),
            m(Visit::Second, Some(date(2015, 6, 1)), Some("1")),
        ];
        let policy = MissingVisitPolicy::Blank;
        assert_eq!(resolve(&ms, date(2015, 5, 31), policy).value(), Some("2"));
        assert_eq!(resolve(&ms, date(2015, 6, 1), policy).value(), Some("1"));
    }

    #[test]
    fn undated_visits_are_ignored() {
        let ms = [
            m(Visit::First, None, Some("0")),
            m(Visit::Second, None, Some("1")),
            m(Visit::Third, Some(date(2019, 1, 1)), Some("2")),
        ];
        let policy = MissingVisitPolicy::Blank;
        assert_eq!(resolve(&ms, date(2018, 1, 1), policy).value(), Some("0"));
        assert_eq!(resolve(&ms, date(2020, 1, 1), policy).value(), Some("2"));
    }

    #[test]
    fn no_measurements_is_unlinked() {
        let resolved = resolve(&[], date(2018, 1, 1), MissingVisitPolicy::Blank);
        assert_eq!(resolved, Resolution::Unlinked);
        assert_eq!(resolved.visit(), None);
    }
}
