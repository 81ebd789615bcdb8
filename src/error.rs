//! Error types for usage-miner.
//!
//! All fallible operations in the crate return [`Result`], whose error side is
//! the [`MinerError`] enum. The two precondition failures of the pipeline,
//! [`MinerError::SchemaMismatch`] and [`MinerError::PageUniverseMismatch`],
//! carry both lengths so the message names the invariant that failed.
//!
//! Discarded one-request sessions and empty recommendation sets are *not*
//! errors; they are reported as data by the session and cluster modules.
//!
//! # Examples
//!
//! ```
//! use usage_miner::error::{MinerError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(MinerError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for usage-miner operations.
#[derive(Error, Debug)]
pub enum MinerError {
    /// I/O errors (reading logs, writing exports)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A feature vector does not match the active popularity schema.
    #[error(
        "Schema mismatch: feature vector has {actual} entries but the popularity schema has {expected} pages"
    )]
    SchemaMismatch { expected: usize, actual: usize },

    /// A user vector does not cover the cluster matrix page universe.
    #[error(
        "Page universe mismatch: user vector has {vector} entries but the cluster matrix has {pages} pages"
    )]
    PageUniverseMismatch { pages: usize, vector: usize },

    /// Malformed input (log rows, cluster matrix lines, timestamps)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument passed to an operation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with MinerError.
pub type Result<T> = std::result::Result<T, MinerError>;

impl MinerError {
    /// Create a schema mismatch error.
    pub fn schema_mismatch(expected: usize, actual: usize) -> Self {
        MinerError::SchemaMismatch { expected, actual }
    }

    /// Create a page universe mismatch error.
    pub fn page_universe_mismatch(pages: usize, vector: usize) -> Self {
        MinerError::PageUniverseMismatch { pages, vector }
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        MinerError::Parse(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        MinerError::Config(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        MinerError::InvalidArgument(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        MinerError::Other(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        MinerError::Other(format!("Internal error: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = MinerError::parse("bad line");
        assert_eq!(error.to_string(), "Parse error: bad line");

        let error = MinerError::invalid_config("threshold out of range");
        assert_eq!(
            error.to_string(),
            "Configuration error: threshold out of range"
        );
    }

    #[test]
    fn test_mismatch_messages_name_both_lengths() {
        let error = MinerError::schema_mismatch(3, 2);
        let message = error.to_string();
        assert!(message.contains("Schema mismatch"));
        assert!(message.contains("2 entries"));
        assert!(message.contains("3 pages"));

        let error = MinerError::page_universe_mismatch(4, 30);
        let message = error.to_string();
        assert!(message.contains("Page universe mismatch"));
        assert!(message.contains("30 entries"));
        assert!(message.contains("4 pages"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let miner_error = MinerError::from(io_error);

        match miner_error {
            MinerError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
