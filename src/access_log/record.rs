//! Access-log rows and the request events derived from them.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{MinerError, Result};

/// Common Log Format timestamp, e.g. `01/Jul/1995:00:00:01 -0400`.
const CLF_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Plain `YYYY-MM-DD HH:MM:SS` timestamp, interpreted as UTC.
const PLAIN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of an access log.
///
/// Unknown columns are ignored when reading; `bytes` may be absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRecord {
    /// Requesting host; identifies the user.
    pub host: String,

    /// Request time, either integer seconds or a parseable timestamp.
    pub time: String,

    /// HTTP method.
    pub method: String,

    /// Requested URL.
    pub url: String,

    /// HTTP response status.
    pub response: u16,

    /// Response size, `None` when the log has no value.
    #[serde(default)]
    pub bytes: Option<u64>,
}

impl AccessRecord {
    /// Create a record from its parts.
    pub fn new(
        host: impl Into<String>,
        time: impl Into<String>,
        method: impl Into<String>,
        url: impl Into<String>,
        response: u16,
    ) -> Self {
        AccessRecord {
            host: host.into(),
            time: time.into(),
            method: method.into(),
            url: url.into(),
            response,
            bytes: None,
        }
    }

    /// Set the response size.
    pub fn with_bytes(mut self, bytes: u64) -> Self {
        self.bytes = Some(bytes);
        self
    }

    /// Request time in seconds.
    pub fn timestamp(&self) -> Result<i64> {
        parse_timestamp(&self.time)
    }

    /// Convert into the event consumed by the sessionizer.
    pub fn to_event(&self) -> Result<RequestEvent> {
        Ok(RequestEvent {
            user_id: self.host.clone(),
            timestamp: self.timestamp()?,
            url: self.url.clone(),
        })
    }
}

/// A single page request of one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestEvent {
    pub user_id: String,
    pub timestamp: i64,
    pub url: String,
}

impl RequestEvent {
    pub fn new(user_id: impl Into<String>, timestamp: i64, url: impl Into<String>) -> Self {
        RequestEvent {
            user_id: user_id.into(),
            timestamp,
            url: url.into(),
        }
    }
}

/// Parse integer seconds, RFC 3339, Common Log Format or `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(input: &str) -> Result<i64> {
    let input = input.trim();

    if let Ok(secs) = input.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_str(input, CLF_TIME_FORMAT) {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, PLAIN_TIME_FORMAT) {
        return Ok(dt.and_utc().timestamp());
    }

    Err(MinerError::parse(format!("Unrecognized timestamp: '{input}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_seconds() {
        assert_eq!(parse_timestamp("804571201").unwrap(), 804571201);
        assert_eq!(parse_timestamp(" 42 ").unwrap(), 42);
    }

    #[test]
    fn test_parse_formatted_timestamps() {
        assert_eq!(parse_timestamp("1970-01-01T00:01:40Z").unwrap(), 100);
        assert_eq!(
            parse_timestamp("01/Jan/1970:01:00:00 +0100").unwrap(),
            0
        );
        assert_eq!(parse_timestamp("1970-01-01 00:10:00").unwrap(), 600);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let result = parse_timestamp("yesterday");
        assert!(matches!(result, Err(MinerError::Parse(_))));
    }

    #[test]
    fn test_record_to_event() {
        let record = AccessRecord::new("host-a", "100", "GET", "/index.html", 200);
        let event = record.to_event().unwrap();
        assert_eq!(event, RequestEvent::new("host-a", 100, "/index.html"));
    }
}
