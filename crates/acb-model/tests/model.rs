//! Tests for acb-model types.

use acb_model::{
    Event, EventTable, Granularity, ModelError, SubjectId, Visit, VisitDates, VisitSeries,
};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn event_table_rejects_misaligned_values() {
    let mut table = EventTable::new(vec!["aa_meta".to_string(), "class_other".to_string()]);
    let event = Event {
        subject: SubjectId::new("A1").unwrap(),
        date: date(2015, 1, 10),
        data_provider: Some(1.0),
        time_in_sample: None,
        values: vec![Some(1.0)],
    };
    assert_eq!(
        table.push(event),
        Err(ModelError::ValueCountMismatch {
            expected: 2,
            actual: 1
        })
    );
    assert!(table.is_empty());
}

#[test]
fn event_table_keeps_columns_and_events() {
    let mut table = EventTable::new(vec!["aa_meta".to_string()]);
    for (day, value) in [(date(2015, 1, 10), 1.0), (date(2016, 7, 2), 0.5)] {
        table
            .push(Event {
                subject: SubjectId::new("A1").unwrap(),
                date: day,
                data_provider: None,
                time_in_sample: None,
                values: vec![Some(value)],
            })
            .unwrap();
    }
    assert_eq!(table.len(), 2);
    assert_eq!(table.column_index("aa_meta"), Some(0));
    assert_eq!(table.events()[1].date, date(2016, 7, 2));
}

#[test]
fn visit_series_pairs_values_with_dates() {
    let dates = VisitDates::new([Some(date(2010, 1, 1)), Some(date(2015, 6, 1)), None]);
    let series = VisitSeries::new([Some("1".to_string()), None, Some("2".to_string())]);
    let measurements = series.measurements(&dates);

    assert_eq!(measurements[0].visit, Visit::First);
    assert_eq!(measurements[0].value, Some("1"));
    assert_eq!(measurements[1].date, Some(date(2015, 6, 1)));
    assert_eq!(measurements[1].value, None);
    assert_eq!(measurements[2].date, None);
    assert_eq!(measurements[2].value, Some("2"));
}

#[test]
fn visit_numbers_and_prefixes() {
    let numbered: Vec<(usize, &str)> = Visit::ALL.iter().map(|v| (v.number(), v.prefix())).collect();
    assert_eq!(numbered, vec![(1, "first"), (2, "second"), (3, "third")]);
}

#[test]
fn granularity_serializes_snake_case() {
    let json = serde_json::to_string(&Granularity::Month).unwrap();
    assert_eq!(json, "\"month\"");
}
