//! Calendar periods used to bucket prescription events.
//!
//! A period is identified by its first day. Month periods start on the 1st of
//! the month, year periods on January 1st. The first day doubles as the
//! representative date of every panel row in that period.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Calendar bucket size for panel aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 2] = [Granularity::Month, Granularity::Year];

    /// Name of the period label column in output tables.
    pub fn period_column(self) -> &'static str {
        match self {
            Granularity::Month => "month_year",
            Granularity::Year => "year",
        }
    }

    /// Default output file stem for the panel at this granularity.
    pub fn output_stem(self) -> &'static str {
        match self {
            Granularity::Month => "id_months",
            Granularity::Year => "id_years",
        }
    }

    /// Truncate a date to the start of its period.
    pub fn period_of(self, date: NaiveDate) -> Period {
        let start = match self {
            Granularity::Month => date - Days::new(u64::from(date.day0())),
            Granularity::Year => date - Days::new(u64::from(date.ordinal0())),
        };
        Period {
            granularity: self,
            start,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Month => f.write_str("month"),
            Granularity::Year => f.write_str("year"),
        }
    }
}

impl FromStr for Granularity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "m" => Ok(Granularity::Month),
            "year" | "y" => Ok(Granularity::Year),
            other => Err(ModelError::UnknownGranularity(other.to_string())),
        }
    }
}

/// One calendar bucket, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    granularity: Granularity,
    start: NaiveDate,
}

impl Period {
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// First day of the period; the representative date of its panel rows.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The period immediately after this one, `None` past the calendar range.
    pub fn next(&self) -> Option<Period> {
        let start = match self.granularity {
            Granularity::Month => self.start.checked_add_months(Months::new(1))?,
            Granularity::Year => self.start.checked_add_months(Months::new(12))?,
        };
        Some(Period {
            granularity: self.granularity,
            start,
        })
    }

    /// Every period from `self` through `last`, both inclusive.
    ///
    /// Empty when `last` precedes `self`.
    pub fn through(self, last: Period) -> impl Iterator<Item = Period> {
        std::iter::successors(Some(self), Period::next).take_while(move |p| *p <= last)
    }

    /// Label as written in the period column: `YYYY-MM` or `YYYY`.
    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Month => format!("{:04}-{:02}", self.start.year(), self.start.month()),
            Granularity::Year => format!("{:04}", self.start.year()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_truncates_to_first_day() {
        let p = Granularity::Month.period_of(date(2015, 3, 31));
        assert_eq!(p.start(), date(2015, 3, 1));
        assert_eq!(p.label(), "2015-03");
    }

    #[test]
    fn year_truncates_to_january_first() {
        let p = Granularity::Year.period_of(date(2016, 12, 31));
        assert_eq!(p.start(), date(2016, 1, 1));
        assert_eq!(p.label(), "2016");
    }

    #[test]
    fn through_is_inclusive_and_crosses_year_boundary() {
        let first = Granularity::Month.period_of(date(2014, 11, 20));
        let last = Granularity::Month.period_of(date(2015, 2, 2));
        let labels: Vec<String> = first.through(last).map(|p| p.label()).collect();
        assert_eq!(labels, vec!["2014-11", "2014-12", "2015-01", "2015-02"]);
    }

    #[test]
    fn through_single_and_reversed() {
        let p = Granularity::Year.period_of(date(2010, 6, 1));
        assert_eq!(p.through(p).count(), 1);
        let earlier = Granularity::Year.period_of(date(2009, 6, 1));
        assert_eq!(p.through(earlier).count(), 0);
    }

    #[test]
    fn granularity_parses_case_insensitively() {
        assert_eq!("Month".parse::<Granularity>().unwrap(), Granularity::Month);
        assert_eq!("y".parse::<Granularity>().unwrap(), Granularity::Year);
        assert!("week".parse::<Granularity>().is_err());
    }
}
