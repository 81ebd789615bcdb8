//! CSV access-log reader.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::access_log::record::{AccessRecord, RequestEvent};
use crate::error::{MinerError, Result};

/// Reads access-log rows from CSV with a header line.
#[derive(Debug, Clone)]
pub struct AccessLogReader {
    /// Stop after this many data rows.
    max_rows: Option<usize>,

    /// Field delimiter.
    delimiter: u8,
}

impl Default for AccessLogReader {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessLogReader {
    /// Create a reader for comma-separated files without a row cap.
    pub fn new() -> Self {
        AccessLogReader {
            max_rows: None,
            delimiter: b',',
        }
    }

    /// Set the row cap.
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read all records from a file.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<AccessRecord>> {
        let path = path.as_ref();
        debug!("Reading access log from {}", path.display());
        let file = File::open(path)?;
        self.read(file)
    }

    /// Read all records from any byte source.
    pub fn read<R: Read>(&self, source: R) -> Result<Vec<AccessRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(source);

        let limit = self.max_rows.unwrap_or(usize::MAX);
        let mut records = Vec::new();

        for (row, result) in reader.deserialize::<AccessRecord>().take(limit).enumerate() {
            // Row numbers are 1-based and count the header line.
            let record = result
                .map_err(|e| MinerError::parse(format!("Access log row {}: {e}", row + 2)))?;
            records.push(record);
        }

        debug!("Read {} access log rows", records.len());
        Ok(records)
    }

    /// Read a file and convert every row into a request event.
    pub fn read_events<P: AsRef<Path>>(&self, path: P) -> Result<Vec<RequestEvent>> {
        self.read_path(path)?
            .iter()
            .map(AccessRecord::to_event)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
host,time,method,url,response,bytes
a.example,100,GET,/index.html,200,512
b.example,101,POST,/form,200,0
a.example,160,GET,/images/logo.gif,200,
";

    #[test]
    fn test_read_all_rows() {
        let records = AccessLogReader::new().read(LOG.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].host, "a.example");
        assert_eq!(records[0].time, "100");
        assert_eq!(records[1].method, "POST");
        assert_eq!(records[2].response, 200);
        assert_eq!(records[0].bytes, Some(512));
        assert_eq!(records[1].bytes, Some(0));
        assert_eq!(records[2].bytes, None);
    }

    #[test]
    fn test_missing_bytes_column() {
        let log = "host,time,method,url,response\na,1,GET,/x,200\n";
        let records = AccessLogReader::new().read(log.as_bytes()).unwrap();
        assert_eq!(records, vec![AccessRecord::new("a", "1", "GET", "/x", 200)]);
    }

    #[test]
    fn test_tab_delimited_log() {
        let log = "host\ttime\tmethod\turl\tresponse\tbytes\n\
                   a.example\t01/Jul/1995:00:00:01 -0400\tGET\t/history/apollo/\t200\t6245\n";
        let records = AccessLogReader::new()
            .with_delimiter(b'\t')
            .read(log.as_bytes())
            .unwrap();
        assert_eq!(
            records,
            vec![
                AccessRecord::new(
                    "a.example",
                    "01/Jul/1995:00:00:01 -0400",
                    "GET",
                    "/history/apollo/",
                    200
                )
                .with_bytes(6245)
            ]
        );
        assert_eq!(records[0].timestamp().unwrap(), 804571201);
    }

    #[test]
    fn test_max_rows() {
        let records = AccessLogReader::new()
            .with_max_rows(Some(2))
            .read(LOG.as_bytes())
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_malformed_row_names_line() {
        let log = "host,time,method,url,response\na,1,GET,/x,200\nb,2,GET,/y,not-a-status\n";
        let err = AccessLogReader::new().read(log.as_bytes()).unwrap_err();
        match err {
            MinerError::Parse(message) => assert!(message.contains("row 3")),
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_events_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs.csv");
        std::fs::write(&path, LOG).unwrap();

        let events = AccessLogReader::new().read_events(&path).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], RequestEvent::new("a.example", 100, "/index.html"));
    }
}
