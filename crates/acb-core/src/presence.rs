//! Presence windows derived from the raw prescription log and mortality.
//!
//! A subject's window opens on its earliest valid prescription date and
//! closes on its recorded death date, if any. Subjects that never appear in
//! the log with a usable date get no window.

use std::collections::BTreeMap;

use acb_ingest::LogEntry;
use acb_model::{PresenceWindow, SubjectId};
use chrono::NaiveDate;
use tracing::debug;

/// Windows plus the number of log entries that could not open one.
#[derive(Debug, Clone, Default)]
pub struct PresenceDerivation {
    pub windows: BTreeMap<SubjectId, PresenceWindow>,
    pub placeholder_dates: usize,
    pub unparsable_dates: usize,
}

/// Earliest usable log date per subject, joined with its death date.
pub fn derive_windows(
    log: &[LogEntry],
    deaths: &BTreeMap<SubjectId, NaiveDate>,
    placeholder_dates: &[NaiveDate],
) -> PresenceDerivation {
    let mut first_seen: BTreeMap<&SubjectId, NaiveDate> = BTreeMap::new();
    let mut placeholders = 0usize;
    let mut unparsable = 0usize;
    for entry in log {
        let Some(date) = entry.date else {
            unparsable += 1;
            continue;
        };
        if placeholder_dates.contains(&date) {
            placeholders += 1;
            continue;
        }
        first_seen
            .entry(&entry.subject)
            .and_modify(|first| *first = (*first).min(date))
            .or_insert(date);
    }

    let windows: BTreeMap<SubjectId, PresenceWindow> = first_seen
        .into_iter()
        .map(|(subject, first)| {
            let death = deaths.get(subject).copied();
            (subject.clone(), PresenceWindow::new(first, death))
        })
        .collect();
    debug!(
        subjects = windows.len(),
        deaths = windows.values().filter(|w| w.death.is_some()).count(),
        placeholder_dates = placeholders,
        unparsable_dates = unparsable,
        "presence windows derived"
    );
    PresenceDerivation {
        windows,
        placeholder_dates: placeholders,
        unparsable_dates: unparsable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(subject: &str, on: Option<NaiveDate>) -> LogEntry {
        LogEntry {
            subject: SubjectId::new(subject).unwrap(),
            date: on,
        }
    }

    #[test]
    fn earliest_valid_date_opens_the_window() {
        let log = vec![
            entry("1", Some(date(2014, 6, 1))),
            entry("1", Some(date(1901, 1, 1))),
            entry("1", Some(date(2012, 5, 1))),
            entry("2", None),
            entry("3", Some(date(2037, 7, 7))),
        ];
        let mut deaths = BTreeMap::new();
        deaths.insert(SubjectId::new("1").unwrap(), date(2018, 3, 1));
        deaths.insert(SubjectId::new("4").unwrap(), date(2019, 1, 1));

        let derived = derive_windows(&log, &deaths, &[date(1901, 1, 1), date(2037, 7, 7)]);
        assert_eq!(derived.windows.len(), 1);
        let window = derived.windows[&SubjectId::new("1").unwrap()];
        assert_eq!(window.first, date(2012, 5, 1));
        assert_eq!(window.death, Some(date(2018, 3, 1)));
        assert_eq!(derived.placeholder_dates, 2);
        assert_eq!(derived.unparsable_dates, 1);
    }
}
