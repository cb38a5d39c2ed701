use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::http_log::TimeRange;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Text typed into the "From" and "To" boxes, both interpreted as UTC
///
/// A date without a time covers the whole day: the start becomes midnight and the
/// end becomes the last instant of that day.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct DateRangeInput {
    pub start: String,
    pub end: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DateInputError {
    #[error("invalid start date {0:?}, use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    Start(String),
    #[error("invalid end date {0:?}, use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    End(String),
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Start,
    End,
}

impl DateRangeInput {
    pub fn is_empty(&self) -> bool {
        self.start.trim().is_empty() && self.end.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.start.clear();
        self.end.clear();
    }

    pub fn to_time_range(&self) -> Result<TimeRange, DateInputError> {
        let start = parse_bound(&self.start, Bound::Start)
            .ok_or_else(|| DateInputError::Start(self.start.clone()))?;
        let end = parse_bound(&self.end, Bound::End)
            .ok_or_else(|| DateInputError::End(self.end.clone()))?;
        Ok(TimeRange::new(start, end))
    }
}

/// Outer `None` means the text is not a valid date, inner `None` means no bound was given
fn parse_bound(text: &str, bound: Bound) -> Option<Option<DateTime<Utc>>> {
    let text = text.trim();
    if text.is_empty() {
        return Some(None);
    }
    if let Some(date_time) = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(Some(Utc.from_utc_datetime(&date_time)));
    }
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
    let date_time = match bound {
        Bound::Start => date.and_hms_opt(0, 0, 0)?,
        Bound::End => date.and_hms_nano_opt(23, 59, 59, 999_999_999)?,
    };
    Some(Some(Utc.from_utc_datetime(&date_time)))
}
