use std::{fmt::Display, net::IpAddr, str::FromStr};

use chrono::{DateTime, Utc};

use super::error::ParseFailure;

/// Format used when rendering timestamps for display
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One fully validated line of the HTTP connection log
///
/// Columns 6, 10 and 11 of the source line are not kept.
#[derive(serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    timestamp: DateTime<Utc>,
    connection_id: String,
    source_address: IpAddr,
    source_port: i64,
    dest_address: IpAddr,
    dest_port: i64,
    method: String,
    host: IpAddr,
    uri: String,
    request_body_len: i64,
    response_body_len: i64,
    status_code: i64,
}

/// Names of the fields shown in the detail view, in display order
#[cfg_attr(test, derive(strum::EnumIter))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Timestamp,
    ConnectionId,
    SourceAddress,
    SourcePort,
    DestAddress,
    DestPort,
    Method,
    Host,
    Uri,
    RequestBodyLen,
    ResponseBodyLen,
    StatusCode,
}

impl RecordField {
    pub const ALL: [RecordField; 12] = [
        RecordField::Timestamp,
        RecordField::ConnectionId,
        RecordField::SourceAddress,
        RecordField::SourcePort,
        RecordField::DestAddress,
        RecordField::DestPort,
        RecordField::Method,
        RecordField::Host,
        RecordField::Uri,
        RecordField::RequestBodyLen,
        RecordField::ResponseBodyLen,
        RecordField::StatusCode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RecordField::Timestamp => "timestamp",
            RecordField::ConnectionId => "connection_id",
            RecordField::SourceAddress => "source_address",
            RecordField::SourcePort => "source_port",
            RecordField::DestAddress => "dest_address",
            RecordField::DestPort => "dest_port",
            RecordField::Method => "method",
            RecordField::Host => "host",
            RecordField::Uri => "uri",
            RecordField::RequestBodyLen => "request_body_len",
            RecordField::ResponseBodyLen => "response_body_len",
            RecordField::StatusCode => "status_code",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name().fmt(f)
    }
}

impl LogRecord {
    /// Parses one line (without its line terminator) into a record
    pub fn parse(line: &str) -> Result<Self, ParseFailure> {
        line.parse()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn source_address(&self) -> IpAddr {
        self.source_address
    }

    pub fn source_port(&self) -> i64 {
        self.source_port
    }

    pub fn dest_address(&self) -> IpAddr {
        self.dest_address
    }

    pub fn dest_port(&self) -> i64 {
        self.dest_port
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Always an address literal, the log schema does not carry host names here
    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn request_body_len(&self) -> i64 {
        self.request_body_len
    }

    pub fn response_body_len(&self) -> i64 {
        self.response_body_len
    }

    pub fn status_code(&self) -> i64 {
        self.status_code
    }

    /// Single line rendering used by list views
    pub fn summary(&self) -> String {
        self.to_string()
    }

    pub fn value(&self, field: RecordField) -> String {
        match field {
            RecordField::Timestamp => self.timestamp.format(TIMESTAMP_DISPLAY_FORMAT).to_string(),
            RecordField::ConnectionId => self.connection_id.clone(),
            RecordField::SourceAddress => self.source_address.to_string(),
            RecordField::SourcePort => self.source_port.to_string(),
            RecordField::DestAddress => self.dest_address.to_string(),
            RecordField::DestPort => self.dest_port.to_string(),
            RecordField::Method => self.method.clone(),
            RecordField::Host => self.host.to_string(),
            RecordField::Uri => self.uri.clone(),
            RecordField::RequestBodyLen => self.request_body_len.to_string(),
            RecordField::ResponseBodyLen => self.response_body_len.to_string(),
            RecordField::StatusCode => self.status_code.to_string(),
        }
    }

    /// Returns the value of the field with this name if such a field exists
    pub fn field_value(&self, name: &str) -> Option<String> {
        RecordField::from_name(name).map(|field| self.value(field))
    }

    /// Field name and display value pairs for a detail view
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        RecordField::ALL
            .into_iter()
            .map(|field| (field.name(), self.value(field)))
            .collect()
    }
}

impl FromStr for LogRecord {
    type Err = ParseFailure;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let columns: Vec<&str> = line.split('\t').collect();
        let column = |index: usize| {
            columns
                .get(index)
                .copied()
                .ok_or(ParseFailure::MissingField { column: index })
        };

        // Conversion order decides which failure gets reported for a line with several problems
        let timestamp = parse_timestamp(column(0)?)?;
        let connection_id = column(1)?.to_string();
        let source_address = parse_address(2, column(2)?)?;
        let dest_address = parse_address(4, column(4)?)?;
        let source_port = parse_integer(3, column(3)?)?;
        let dest_port = parse_integer(5, column(5)?)?;
        let method = column(7)?.to_string();
        let host = parse_address(8, column(8)?)?;
        let uri = column(9)?.to_string();
        let request_body_len = parse_integer(12, column(12)?)?;
        let response_body_len = parse_integer(13, column(13)?)?;
        let status_code = parse_integer(14, column(14)?)?;

        Ok(Self {
            timestamp,
            connection_id,
            source_address,
            source_port,
            dest_address,
            dest_port,
            method,
            host,
            uri,
            request_body_len,
            response_body_len,
            status_code,
        })
    }
}

impl Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] UID: {} {} -> {} {} {} ReqLen={} RespLen={} Status={}",
            self.timestamp.format(TIMESTAMP_DISPLAY_FORMAT),
            self.connection_id,
            Endpoint(self.source_address, self.source_port),
            Endpoint(self.dest_address, self.dest_port),
            self.method,
            self.uri,
            self.request_body_len,
            self.response_body_len,
            self.status_code
        )
    }
}

/// Address and port pair, ports are not range checked so [`std::net::SocketAddr`] does not fit
struct Endpoint(IpAddr, i64);

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            IpAddr::V4(addr) => write!(f, "{addr}:{}", self.1),
            IpAddr::V6(addr) => write!(f, "[{addr}]:{}", self.1),
        }
    }
}

/// Epoch seconds with a fractional part, kept to microsecond precision
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ParseFailure> {
    let invalid = || ParseFailure::InvalidTimestamp {
        value: value.to_string(),
    };
    let seconds: f64 = value.trim().parse().map_err(|_| invalid())?;
    if !seconds.is_finite() {
        return Err(invalid());
    }
    let micros = (seconds * 1_000_000.0).round();
    if micros < i64::MIN as f64 || micros > i64::MAX as f64 {
        return Err(invalid());
    }
    DateTime::from_timestamp_micros(micros as i64).ok_or_else(invalid)
}

fn parse_address(column: usize, value: &str) -> Result<IpAddr, ParseFailure> {
    value.parse().map_err(|_| ParseFailure::InvalidAddress {
        column,
        value: value.to_string(),
    })
}

fn parse_integer(column: usize, value: &str) -> Result<i64, ParseFailure> {
    value.trim().parse().map_err(|_| ParseFailure::InvalidInteger {
        column,
        value: value.to_string(),
    })
}
