use std::collections::BTreeMap;

use acb_core::{MissingVisitPolicy, aggregate, age_in_years, resolve};
use acb_model::{Event, EventTable, Granularity, Measurement, SubjectId, Visit};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()
}

fn day(offset: u64) -> NaiveDate {
    base() + Days::new(offset)
}

fn event_table(events: &[(u8, u64, f64)]) -> EventTable {
    let mut table = EventTable::new(vec!["aa_1".to_string()]);
    for &(subject, offset, value) in events {
        table
            .push(Event {
                subject: SubjectId::new(subject.to_string()).unwrap(),
                date: day(offset),
                data_provider: Some(1.0),
                time_in_sample: None,
                values: vec![Some(value)],
            })
            .unwrap();
    }
    table
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn grid_has_no_gaps(
        events in prop::collection::vec((0u8..3, 0u64..2500, 0.0f64..3.0), 1..60),
        yearly in any::<bool>(),
    ) {
        let granularity = if yearly { Granularity::Year } else { Granularity::Month };
        let table = event_table(&events);
        let grid = aggregate(&table, granularity, &["aa_1".to_string()]).unwrap();

        let mut by_subject: BTreeMap<&SubjectId, Vec<_>> = BTreeMap::new();
        for row in &grid.rows {
            by_subject.entry(&row.subject).or_default().push(row);
        }
        for (subject, rows) in by_subject {
            let observed: Vec<_> = table
                .events()
                .iter()
                .filter(|e| &e.subject == subject)
                .map(|e| granularity.period_of(e.date))
                .collect();
            let first = *observed.iter().min().unwrap();
            let last = *observed.iter().max().unwrap();
            let expected: Vec<_> = first.through(last).collect();
            let periods: Vec<_> = rows.iter().map(|r| r.period).collect();
            prop_assert_eq!(periods, expected);

            for row in rows {
                if row.count == 0 {
                    prop_assert!(row.sums.iter().all(|s| *s == 0.0));
                }
            }
        }

        let total: u64 = grid.rows.iter().map(|r| r.count).sum();
        prop_assert_eq!(total, events.len() as u64);
    }

    #[test]
    fn resolution_uses_latest_applicable_visit(
        dates in prop::array::uniform3(prop::option::of(0u64..4000)),
        values in prop::array::uniform3(prop::option::of(0u8..5)),
        target in 0u64..4000,
    ) {
        let texts: Vec<Option<String>> = values.iter().map(|v| v.map(|v| v.to_string())).collect();
        let measurements: Vec<Measurement<'_>> = Visit::ALL
            .iter()
            .map(|&visit| Measurement {
                visit,
                date: dates[visit.index()].map(day),
                value: texts[visit.index()].as_deref(),
            })
            .collect();

        let applicable = [Visit::Third, Visit::Second]
            .into_iter()
            .find(|visit| dates[visit.index()].is_some_and(|d| d <= target))
            .unwrap_or(Visit::First);
        let resolved = resolve(&measurements, day(target), MissingVisitPolicy::Blank);
        prop_assert_eq!(resolved.visit(), Some(applicable));
        prop_assert_eq!(resolved.value(), texts[applicable.index()].as_deref());
    }

    #[test]
    fn age_never_decreases(birth in 0u64..20000, a in 0u64..40000, b in 0u64..40000) {
        let birth = NaiveDate::from_ymd_opt(1920, 1, 1).unwrap() + Days::new(birth);
        let (earlier, later) = (a.min(b), a.max(b));
        let start = NaiveDate::from_ymd_opt(1940, 1, 1).unwrap();
        let age_earlier = age_in_years(birth, start + Days::new(earlier));
        let age_later = age_in_years(birth, start + Days::new(later));
        prop_assert!(age_earlier <= age_later);
    }
}
