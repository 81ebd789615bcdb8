//! Request filtering: keep successful page requests, drop images.

use regex::Regex;

use crate::access_log::record::AccessRecord;
use crate::error::{MinerError, Result};

/// File extensions treated as image requests.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "gif", "bmp", "xbm", "png"];

/// A stateless predicate over access-log rows.
#[derive(Clone, Debug)]
pub struct RequestFilter {
    method: String,
    status: u16,
    excluded: Option<Regex>,
}

impl RequestFilter {
    /// Create a filter accepting `method` requests answered with `status`
    /// whose URL does not contain any of `excluded_extensions`.
    pub fn new(method: &str, status: u16, excluded_extensions: &[&str]) -> Result<Self> {
        let alternatives = excluded_extensions
            .iter()
            .map(|ext| regex::escape(ext.trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join("|");
        // An empty alternation would match every URL.
        let excluded = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\.(?:{alternatives})");
            Some(Regex::new(&pattern).map_err(|e| {
                MinerError::invalid_argument(format!("Invalid extension pattern: {e}"))
            })?)
        };

        Ok(RequestFilter {
            method: method.to_string(),
            status,
            excluded,
        })
    }

    /// Whether the record is kept.
    pub fn accepts(&self, record: &AccessRecord) -> bool {
        record.method == self.method
            && record.response == self.status
            && !self
                .excluded
                .as_ref()
                .is_some_and(|re| re.is_match(&record.url))
    }

    /// Keep the accepted records, preserving order.
    pub fn apply(&self, records: Vec<AccessRecord>) -> Vec<AccessRecord> {
        records.into_iter().filter(|r| self.accepts(r)).collect()
    }
}

impl Default for RequestFilter {
    fn default() -> Self {
        Self::new("GET", 200, IMAGE_EXTENSIONS).expect("Default extension pattern should be valid")
    }
}
