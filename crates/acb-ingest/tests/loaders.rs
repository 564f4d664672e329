use std::fs;
use std::path::PathBuf;

use acb_ingest::{
    CsvOptions, IngestError, TextEncoding, load_demographics, load_events, load_mortality,
    load_prescription_log, load_presence_table, load_static_table, load_visit_answers,
    load_visit_dates, load_visit_series,
};
use acb_model::{SubjectId, Visit};
use chrono::NaiveDate;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn id(raw: &str) -> SubjectId {
    SubjectId::new(raw).unwrap()
}

#[test]
fn events_drop_placeholders_and_bad_dates() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "meds.csv",
        b"id,date,data_provider,time_in_sample,aa_meta,aa_1\n\
          1,2015-03-04,3,120,1,2\n\
          1,1901-01-01,3,120,1,2\n\
          2,not a date,1,40,0,0\n\
          ,2015-03-04,1,40,0,0\n\
          2,2016-01-09,1,40,,x\n",
    );
    let columns = vec!["aa_meta".to_string(), "aa_1".to_string()];
    let load = load_events(
        &path,
        &CsvOptions::default(),
        &columns,
        &[date(1901, 1, 1)],
    )
    .expect("load events");

    assert_eq!(load.table.len(), 2);
    assert_eq!(load.placeholder_dates, 1);
    assert_eq!(load.unparsable_dates, 1);
    assert_eq!(load.missing_ids, 1);
    assert_eq!(load.dropped(), 3);

    let first = &load.table.events()[0];
    assert_eq!(first.subject, id("1"));
    assert_eq!(first.values, vec![Some(1.0), Some(2.0)]);
    assert_eq!(first.data_provider, Some(3.0));
    let last = &load.table.events()[1];
    assert_eq!(last.values, vec![None, None]);
}

#[test]
fn events_require_indicator_columns() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "meds.csv", b"id,date,data_provider,time_in_sample\n");
    let err = load_events(
        &path,
        &CsvOptions::default(),
        &["aa_meta".to_string()],
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "aa_meta"));
}

#[test]
fn demographics_build_birth_date_on_day_one() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "demographics.csv",
        b"id,sex,birth_year,birth_month\n1,0,1950,3\n2,1,1948,11.0\n3,1,,4\n1,1,1990,1\n",
    );
    let demo = load_demographics(&path, &CsvOptions::default()).unwrap();
    assert_eq!(demo.len(), 3);
    assert_eq!(demo[&id("1")].birth_date, Some(date(1950, 3, 1)));
    assert_eq!(demo[&id("1")].sex.as_deref(), Some("0"));
    assert_eq!(demo[&id("2")].birth_date, Some(date(1948, 11, 1)));
    assert_eq!(demo[&id("3")].birth_date, None);
}

#[test]
fn visit_dates_are_positional() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "test_date.csv",
        b"id,X53.0.0,X53.1.0,X53.2.0\n1,2010-05-01,,2019-02-03\n",
    );
    let dates = load_visit_dates(&path, &CsvOptions::default()).unwrap();
    let subject = dates[&id("1")];
    assert_eq!(subject.get(Visit::First), Some(date(2010, 5, 1)));
    assert_eq!(subject.get(Visit::Second), None);
    assert_eq!(subject.get(Visit::Third), Some(date(2019, 2, 3)));

    let short = write(&dir, "short.csv", b"id,a,b\n1,2010-01-01,\n");
    let err = load_visit_dates(&short, &CsvOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        IngestError::TooFewColumns {
            expected: 3,
            found: 2,
            ..
        }
    ));
}

#[test]
fn visit_series_reads_numbered_columns() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "tobacco.csv",
        b"id,smoking_1,smoking_2,smoking_3\n1,0,-3,\n",
    );
    let series = load_visit_series(&path, &CsvOptions::default(), "smoking").unwrap();
    let s = &series[&id("1")];
    assert_eq!(s.get(Visit::First), Some("0"));
    assert_eq!(s.get(Visit::Second), Some("-3"));
    assert_eq!(s.get(Visit::Third), None);

    let err = load_visit_series(&path, &CsvOptions::default(), "alc_freq").unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn { .. }));
}

#[test]
fn visit_answers_group_by_prefix() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "education.csv",
        b"id,first_1,first_2,second_1,third_1,third_2\n1,1,3,,-7,\n",
    );
    let answers = load_visit_answers(&path, &CsvOptions::default()).unwrap();
    let a = &answers[&id("1")];
    assert_eq!(a.get(Visit::First), ["1", "3"]);
    assert!(a.get(Visit::Second).is_empty());
    assert_eq!(a.get(Visit::Third), ["-7"]);

    let missing = write(&dir, "bad.csv", b"id,first_1,second_1\n1,1,1\n");
    let err = load_visit_answers(&missing, &CsvOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "third_*"));
}

#[test]
fn static_table_keeps_first_row() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "deprivation.csv",
        b"id,townsend,imd\n1,-2.5,\n1,9,9\n2,1.1,4\n",
    );
    let table = load_static_table(&path, &CsvOptions::default()).unwrap();
    assert_eq!(table.columns, vec!["townsend", "imd"]);
    assert_eq!(
        table.get(&id("1")).unwrap(),
        [Some("-2.5".to_string()), None]
    );
    assert!(table.get(&id("3")).is_none());
}

#[test]
fn presence_table_skips_rows_without_first_date() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "id_present.csv",
        b"id,date_first,date_death\n1,2012-05-01,2018-03-01\n2,2011-01-01,\n3,,2019-01-01\n",
    );
    let windows = load_presence_table(&path, &CsvOptions::default()).unwrap();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[&id("1")].death, Some(date(2018, 3, 1)));
    assert_eq!(windows[&id("2")].death, None);
}

#[test]
fn prescription_log_reads_legacy_format() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "gp_scripts.txt",
        b"eid|data_provider|issue_date|drug_name\n",
    );
    // The log needs `id` and `date` columns; a raw extract without them is rejected.
    let options = CsvOptions::legacy().with_delimiter('|');
    assert!(load_prescription_log(&path, &options, "%d/%m/%Y").is_err());

    let path = write(
        &dir,
        "scripts.txt",
        b"id|date|drug_name\n1|03/02/2011|caf\xe9ine\n1|garbage|x\n2|01/01/1901|y\n",
    );
    assert_eq!(options.encoding, TextEncoding::Windows1252);
    let log = load_prescription_log(&path, &options, "%d/%m/%Y").unwrap();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].date, Some(date(2011, 2, 3)));
    assert_eq!(log[1].date, None);
    assert_eq!(log[2].date, Some(date(1901, 1, 1)));
}

#[test]
fn mortality_keeps_earliest_death() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "death.csv",
        b"id,X40000.0.0\n1,2018-03-01\n1,2017-12-31\n2,\n",
    );
    let deaths = load_mortality(&path, &CsvOptions::default(), "X40000.0.0").unwrap();
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[&id("1")], date(2017, 12, 31));
}
