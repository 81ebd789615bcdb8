//! Configuration for the mining pipeline.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MinerError, Result};

/// Default popularity threshold, as a percentage of all requests.
pub const DEFAULT_POPULARITY_THRESHOLD: f64 = 0.5;

/// Default inactivity timeout between two requests of one session (10 minutes).
pub const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 10 * 60;

/// Default number of log rows read by the filter stage.
pub const DEFAULT_MAX_ROWS: usize = 50_000;

/// Configuration for sessionization and feature extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Pages whose share of all requests is strictly above this percentage
    /// become feature columns.
    pub popularity_threshold: f64,

    /// Maximum gap in seconds between consecutive requests of one session.
    pub session_timeout_secs: i64,

    /// Emit the last open session of each user at end of stream.
    /// Off by default: only a later request closes a session.
    pub flush_trailing_session: bool,

    /// Sessionize users on a rayon thread pool.
    pub parallel: bool,

    /// Thread pool size for parallel sessionization.
    /// If None, uses the number of CPU cores.
    pub threads: Option<usize>,

    /// Maximum number of log rows read by the filter stage (None reads all).
    pub max_rows: Option<usize>,

    /// Append a `-HHMMSS` suffix to grouped table file names.
    pub timestamp_suffix: bool,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            popularity_threshold: DEFAULT_POPULARITY_THRESHOLD,
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
            flush_trailing_session: false,
            parallel: false,
            threads: None,
            max_rows: Some(DEFAULT_MAX_ROWS),
            timestamp_suffix: true,
        }
    }
}

impl MiningConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: MiningConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the popularity threshold percentage.
    pub fn with_popularity_threshold(mut self, threshold: f64) -> Self {
        self.popularity_threshold = threshold;
        self
    }

    /// Set the session inactivity timeout in seconds.
    pub fn with_session_timeout(mut self, secs: i64) -> Self {
        self.session_timeout_secs = secs;
        self
    }

    /// Set whether the trailing session of each user is emitted.
    pub fn with_flush_trailing_session(mut self, flush: bool) -> Self {
        self.flush_trailing_session = flush;
        self
    }

    /// Set whether users are sessionized in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the thread pool size.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the row cap of the filter stage.
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Set whether grouped tables get a timestamp suffix.
    pub fn with_timestamp_suffix(mut self, suffix: bool) -> Self {
        self.timestamp_suffix = suffix;
        self
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.popularity_threshold) {
            return Err(MinerError::invalid_config(format!(
                "popularity_threshold must be within [0, 100], got {}",
                self.popularity_threshold
            )));
        }
        if self.session_timeout_secs < 0 {
            return Err(MinerError::invalid_config(format!(
                "session_timeout_secs must not be negative, got {}",
                self.session_timeout_secs
            )));
        }
        if self.threads == Some(0) {
            return Err(MinerError::invalid_config("threads must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = MiningConfig::default();
        assert_eq!(config.popularity_threshold, 0.5);
        assert_eq!(config.session_timeout_secs, 600);
        assert!(!config.flush_trailing_session);
        assert!(!config.parallel);
        assert_eq!(config.max_rows, Some(50_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = MiningConfig::default()
            .with_popularity_threshold(1.5)
            .with_session_timeout(300)
            .with_flush_trailing_session(true)
            .with_parallel(true)
            .with_threads(4)
            .with_max_rows(None);

        assert_eq!(config.popularity_threshold, 1.5);
        assert_eq!(config.session_timeout_secs, 300);
        assert!(config.flush_trailing_session);
        assert!(config.parallel);
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.max_rows, None);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(
            MiningConfig::default()
                .with_popularity_threshold(101.0)
                .validate()
                .is_err()
        );
        assert!(
            MiningConfig::default()
                .with_session_timeout(-1)
                .validate()
                .is_err()
        );
        assert!(MiningConfig::default().with_threads(0).validate().is_err());
    }

    #[test]
    fn test_from_json_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"session_timeout_secs": 120, "parallel": true}}"#).unwrap();

        let config = MiningConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.session_timeout_secs, 120);
        assert!(config.parallel);
        assert_eq!(config.popularity_threshold, DEFAULT_POPULARITY_THRESHOLD);
    }

    #[test]
    fn test_from_json_file_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"popularity_threshold": -3.0}}"#).unwrap();

        let result = MiningConfig::from_json_file(file.path());
        assert!(matches!(result, Err(MinerError::Config(_))));
    }
}
