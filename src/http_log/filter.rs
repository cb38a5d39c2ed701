use std::fmt::Display;

use chrono::{DateTime, Utc};

use super::record::{LogRecord, TIMESTAMP_DISPLAY_FORMAT};

/// Inclusive timestamp window, either bound may be absent
#[derive(Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Returns `true` if neither bound is set, such a range matches everything
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| timestamp >= start)
            && self.end.map_or(true, |end| timestamp <= end)
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        self.contains(record.timestamp())
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound = |value: Option<DateTime<Utc>>| match value {
            Some(value) => value.format(TIMESTAMP_DISPLAY_FORMAT).to_string(),
            None => "*".to_string(),
        };
        write!(f, "[{} .. {}]", bound(self.start), bound(self.end))
    }
}

/// Keeps the records inside `range`, preserving their order
pub fn filter_records<'a>(
    records: impl IntoIterator<Item = &'a LogRecord>,
    range: &TimeRange,
) -> Vec<&'a LogRecord> {
    records
        .into_iter()
        .filter(|record| range.matches(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[rstest]
    #[case::unbounded(None, None, true)]
    #[case::start_equal(Some(at(5)), None, true)]
    #[case::before_start(Some(at(6)), None, false)]
    #[case::end_equal(None, Some(at(5)), true)]
    #[case::after_end(None, Some(at(4)), false)]
    #[case::inside(Some(at(4)), Some(at(6)), true)]
    #[case::single_instant(Some(at(5)), Some(at(5)), true)]
    #[case::inverted(Some(at(6)), Some(at(4)), false)]
    fn contains(
        #[case] start: Option<DateTime<Utc>>,
        #[case] end: Option<DateTime<Utc>>,
        #[case] expected: bool,
    ) {
        assert_eq!(TimeRange::new(start, end).contains(at(5)), expected);
    }

    #[test]
    fn display() {
        let range = TimeRange::new(Some(at(1)), None);
        assert_eq!(range.to_string(), "[2024-01-01 01:00:00 .. *]");
        assert!(TimeRange::default().is_unbounded());
        assert!(!range.is_unbounded());
    }
}
