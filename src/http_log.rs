//! Parsing and filtering of tab separated HTTP connection logs

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

mod error;
mod filter;
mod record;

#[cfg(test)]
mod tests;

pub use error::{LoadError, ParseFailure};
pub use filter::{filter_records, TimeRange};
pub use record::{LogRecord, RecordField, TIMESTAMP_DISPLAY_FORMAT};

/// All records read from one log file along with the reasons any lines were skipped
///
/// Built in a single pass by [`LogCollection::load`] and never modified afterwards,
/// loading again produces a new collection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogCollection {
    records: Vec<LogRecord>,
    diagnostics: Vec<String>,
}

impl LogCollection {
    /// Reads and parses every line of the file at `path`
    ///
    /// Only failing to open or read the file is an error, lines that do not parse
    /// are skipped and reported in [`LogCollection::diagnostics`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        info!(?path, "loading log file");
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let result = Self::from_reader(BufReader::new(file))?;
        info!(
            records = result.records.len(),
            skipped = result.diagnostics.len(),
            "finished loading log file"
        );
        Ok(result)
    }

    /// Same as [`LogCollection::load`] but reads from an already open source
    pub fn from_reader(reader: impl BufRead) -> Result<Self, LoadError> {
        let mut result = Self::default();
        for (i, line) in reader.split(b'\n').enumerate() {
            let line_number = i + 1;
            let mut line = line.map_err(|source| LoadError::Read {
                line: line_number,
                source,
            })?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            match parse_line(&line) {
                Ok(record) => result.records.push(record),
                Err(e) => {
                    let diagnostic = format!("Skipping line {line_number}: {e}");
                    debug!("{diagnostic}");
                    result.diagnostics.push(diagnostic);
                }
            }
        }
        Ok(result)
    }

    /// Successfully parsed records in file order
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// One message per skipped line in file order
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with `start <= timestamp <= end` in file order, absent bounds do not restrict
    pub fn filter(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<&LogRecord> {
        filter_records(&self.records, &TimeRange::new(start, end))
    }

    /// Positions in [`LogCollection::records`] of the records inside `range`
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn filter_indices(&self, range: &TimeRange) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, record)| range.matches(record).then_some(i))
            .collect()
    }
}

fn parse_line(line: &[u8]) -> Result<LogRecord, ParseFailure> {
    let line = std::str::from_utf8(line).map_err(|_| ParseFailure::NotUtf8)?;
    LogRecord::parse(line)
}
