use std::{io, path::PathBuf};

/// Reason a single log line was rejected
///
/// Column numbers are zero based positions in the tab separated line.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ParseFailure {
    #[error("missing field in column {column}")]
    MissingField { column: usize },

    #[error("invalid timestamp in column 0: {value:?}")]
    InvalidTimestamp { value: String },

    #[error("invalid IP address in column {column}: {value:?}")]
    InvalidAddress { column: usize, value: String },

    #[error("invalid integer in column {column}: {value:?}")]
    InvalidInteger { column: usize, value: String },

    #[error("line is not valid UTF-8")]
    NotUtf8,
}

/// Failure of a whole load, no partial collection is produced
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path:?} for reading")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read line {line}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },
}
