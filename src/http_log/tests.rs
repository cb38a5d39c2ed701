use std::io::Write;

use chrono::TimeZone;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

use super::*;

const PATH_SAMPLE_LOG: &str = "tests/sample_logs/http_sample.log";

const LINE_C1: &str =
    "1000.0\tC1\t10.0.0.1\t80\t10.0.0.2\t8080\t-\tGET\t10.0.0.2\t/index.html\t-\t-\t0\t120\t200";

fn line_at(connection_id: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "{}\t{connection_id}\t10.0.0.1\t80\t10.0.0.2\t8080\t-\tGET\t10.0.0.2\t/\t-\t-\t0\t0\t200",
        timestamp.timestamp()
    )
}

fn connection_ids<'a>(records: impl IntoIterator<Item = &'a LogRecord>) -> Vec<&'a str> {
    records.into_iter().map(|x| x.connection_id()).collect()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

#[fixture]
fn sample() -> LogCollection {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(PATH_SAMPLE_LOG);
    LogCollection::load(path).unwrap()
}

#[fixture]
fn two_days() -> LogCollection {
    let input = [
        line_at("day1", utc(2024, 1, 1, 0, 0, 0)),
        line_at("day2", utc(2024, 1, 2, 12, 0, 0)),
    ]
    .join("\n");
    LogCollection::from_reader(input.as_bytes()).unwrap()
}

#[test]
fn malformed_timestamp_is_skipped() {
    let input = format!("{LINE_C1}\nnot_a_number\tC2\t10.0.0.1\t80\t10.0.0.2\t8080\t-\tGET\t10.0.0.2\t/\t-\t-\t0\t0\t200\n");
    let collection = LogCollection::from_reader(input.as_bytes()).unwrap();

    assert_eq!(collection.len(), 1);
    assert_eq!(collection.records()[0].connection_id(), "C1");
    assert_eq!(collection.records()[0].status_code(), 200);
    assert_eq!(collection.diagnostics().len(), 1);
    assert!(collection.diagnostics()[0].contains("line 2"));
    assert!(collection.diagnostics()[0].contains("not_a_number"));
}

#[rstest]
fn sample_file_counts(sample: LogCollection) {
    // 8 lines, 3 of them invalid
    assert_eq!(sample.records().len(), 5);
    assert_eq!(sample.diagnostics().len(), 3);
    assert_eq!(
        connection_ids(sample.records()),
        vec!["Ck1aB21", "Ck1aB22", "Ck1aB24", "Ck1aB26", "Ck1aB28"]
    );
}

#[rstest]
fn sample_file_diagnostics(sample: LogCollection) {
    insta::assert_debug_snapshot!(sample.diagnostics(), @r#"
    [
        "Skipping line 3: invalid timestamp in column 0: \"bad-ts\"",
        "Skipping line 5: invalid IP address in column 8: \"www.example.com\"",
        "Skipping line 7: missing field in column 12",
    ]
    "#);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does_not_exist.log");
    let err = LogCollection::load(&path).unwrap_err();
    assert!(matches!(err, LoadError::Open { path: ref p, .. } if p == &path));
}

#[test]
fn load_from_disk_with_crlf_and_blank_lines() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{LINE_C1}\r\n\r\n{LINE_C1}\r\n").unwrap();
    file.flush().unwrap();

    let collection = LogCollection::load(file.path()).unwrap();

    assert_eq!(collection.len(), 2);
    assert_eq!(collection.records()[0].status_code(), 200);
    assert_eq!(
        collection.diagnostics(),
        [r#"Skipping line 2: invalid timestamp in column 0: """#.to_string()]
    );
}

#[test]
fn invalid_utf8_only_skips_that_line() {
    let mut input = Vec::new();
    input.extend_from_slice(LINE_C1.as_bytes());
    input.extend_from_slice(b"\n\xff\xfe\tbroken\n");
    input.extend_from_slice(LINE_C1.as_bytes());

    let collection = LogCollection::from_reader(&input[..]).unwrap();

    assert_eq!(collection.len(), 2);
    assert_eq!(
        collection.diagnostics(),
        ["Skipping line 2: line is not valid UTF-8".to_string()]
    );
}

#[test]
fn empty_input() {
    let collection = LogCollection::from_reader(&b""[..]).unwrap();
    assert!(collection.is_empty());
    assert!(collection.diagnostics().is_empty());
}

#[rstest]
fn unbounded_filter_returns_everything(sample: LogCollection) {
    let all: Vec<&LogRecord> = sample.records().iter().collect();
    assert_eq!(sample.filter(None, None), all);
}

#[rstest]
fn inverted_bounds_are_empty(sample: LogCollection) {
    let start = utc(2024, 1, 2, 0, 0, 0);
    let end = utc(2024, 1, 1, 0, 0, 0);
    assert!(sample.filter(Some(start), Some(end)).is_empty());
}

#[rstest]
#[case::start_only(Some(utc(2024, 1, 1, 1, 0, 0)), None)]
#[case::end_only(None, Some(utc(2024, 1, 1, 23, 59, 59)))]
#[case::both(Some(utc(2024, 1, 1, 1, 0, 0)), Some(utc(2024, 1, 2, 0, 0, 0)))]
fn filter_is_idempotent(
    sample: LogCollection,
    #[case] start: Option<DateTime<Utc>>,
    #[case] end: Option<DateTime<Utc>>,
) {
    let once = sample.filter(start, end);
    let twice = filter_records(once.iter().copied(), &TimeRange::new(start, end));
    assert_eq!(twice, once);
}

#[rstest]
fn start_bound_selects_second_day(two_days: LogCollection) {
    let actual = two_days.filter(Some(utc(2024, 1, 2, 0, 0, 0)), None);
    assert_eq!(connection_ids(actual), vec!["day2"]);
}

#[rstest]
fn bounds_are_inclusive(sample: LogCollection) {
    // Exactly the timestamps of the first and fourth records
    let start = utc(2024, 1, 1, 0, 0, 0);
    let end = utc(2024, 1, 2, 0, 0, 0);
    assert_eq!(
        connection_ids(sample.filter(Some(start), Some(end))),
        vec!["Ck1aB21", "Ck1aB22", "Ck1aB24", "Ck1aB26"]
    );
}

#[rstest]
fn filter_indices_match_filter(sample: LogCollection) {
    let range = TimeRange::new(Some(utc(2024, 1, 1, 1, 30, 0)), None);
    let indices = sample.filter_indices(&range);
    assert_eq!(indices, vec![2, 3, 4]);
    let by_index: Vec<&LogRecord> = indices.iter().map(|&i| &sample.records()[i]).collect();
    assert_eq!(by_index, sample.filter(range.start, range.end));
}
