//! Stage orchestration.
//!
//! The pipeline runs three independent stages:
//!
//! - **filter**: read a raw access log and keep successful page requests
//! - **group**: build the popularity schema, sessionize every user and flatten
//!   the results into feature tables
//! - **recommend**: match a user vector against a cluster matrix and derive
//!   the recommendation set
//!
//! Each stage materializes its complete output in memory and returns it; a
//! failing precondition aborts the stage before anything is written.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::access_log::{AccessLogReader, AccessRecord, RequestEvent, RequestFilter};
use crate::cluster::{
    ClusterMatrix, ClusterSimilarityMatcher, MatchResult, Recommendation, RecommendationSelector,
};
use crate::config::MiningConfig;
use crate::error::Result;
use crate::feature::builder::{FeatureTables, FeatureVectorBuilder};
use crate::feature::table::{Column, ColumnKind, DataTable, Value};
use crate::feature::vector::PageVector;
use crate::popularity::{PopularityAnalyzer, PopularitySchema};
use crate::session::{SessionizeOutput, Sessionizer};

/// Name of the filtered log table.
pub const FILTERED_LOGS_TABLE: &str = "filtered_logs";

/// Result of the filter stage.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// Rows read from the log.
    pub rows_read: usize,

    /// Rows kept by the filter, in log order.
    pub records: Vec<AccessRecord>,
}

impl FilterOutput {
    /// The kept rows as a table with the columns `host,time,method,url,response`.
    pub fn to_table(&self) -> Result<DataTable> {
        let mut table = DataTable::new(
            FILTERED_LOGS_TABLE,
            vec![
                Column::new("host", ColumnKind::Text),
                Column::new("time", ColumnKind::Text),
                Column::new("method", ColumnKind::Text),
                Column::new("url", ColumnKind::Text),
                Column::new("response", ColumnKind::Integer),
            ],
        )?;
        for record in &self.records {
            table.push_row(vec![
                Value::Text(record.host.clone()),
                Value::Text(record.time.clone()),
                Value::Text(record.method.clone()),
                Value::Text(record.url.clone()),
                Value::Integer(i64::from(record.response)),
            ])?;
        }
        Ok(table)
    }
}

/// Result of the group stage.
#[derive(Debug, Clone)]
pub struct GroupOutput {
    pub schema: Arc<PopularitySchema>,
    pub sessionized: SessionizeOutput,
    pub tables: FeatureTables,
}

/// Result of the recommend stage.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    pub matching: MatchResult,

    /// Recommendation from the best cluster; `None` when there are no clusters.
    pub recommendation: Option<Recommendation>,
}

/// Runs the mining stages with one configuration.
#[derive(Debug, Clone)]
pub struct MiningPipeline {
    config: MiningConfig,
    filter: RequestFilter,
    matcher: ClusterSimilarityMatcher,
    selector: RecommendationSelector,
}

impl MiningPipeline {
    /// Create a pipeline; the configuration is validated first.
    pub fn new(config: MiningConfig) -> Result<Self> {
        config.validate()?;
        Ok(MiningPipeline {
            config,
            filter: RequestFilter::default(),
            matcher: ClusterSimilarityMatcher::new(),
            selector: RecommendationSelector::new(),
        })
    }

    /// Replace the default GET/200/non-image filter.
    pub fn with_filter(mut self, filter: RequestFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    /// Filter already loaded records.
    pub fn filter_records(&self, records: Vec<AccessRecord>) -> FilterOutput {
        let rows_read = records.len();
        let records = self.filter.apply(records);
        info!("Kept {} of {} log rows", records.len(), rows_read);
        FilterOutput { rows_read, records }
    }

    /// Read up to `max_rows` rows of a raw log and filter them.
    pub fn filter_log<P: AsRef<Path>>(&self, path: P) -> Result<FilterOutput> {
        let records = AccessLogReader::new()
            .with_max_rows(self.config.max_rows)
            .read_path(path)?;
        Ok(self.filter_records(records))
    }

    /// Build the schema, sessionize all users and build the feature tables.
    pub fn group(&self, events: &[RequestEvent]) -> Result<GroupOutput> {
        let schema = Arc::new(
            PopularityAnalyzer::new(self.config.popularity_threshold).analyze(events),
        );
        if schema.is_empty() && !events.is_empty() {
            warn!(
                "No page is above {}% of requests; page columns will be empty",
                self.config.popularity_threshold
            );
        }

        let sessionizer = Sessionizer::from_config(Arc::clone(&schema), &self.config);
        let sessionized = if self.config.parallel {
            sessionizer.sessionize_parallel(events, self.config.threads)?
        } else {
            sessionizer.sessionize(events)?
        };

        let tables = FeatureVectorBuilder::new(Arc::clone(&schema)).build(&sessionized)?;

        Ok(GroupOutput {
            schema,
            sessionized,
            tables,
        })
    }

    /// Read an already filtered log completely and run [`MiningPipeline::group`].
    pub fn group_log<P: AsRef<Path>>(&self, path: P) -> Result<GroupOutput> {
        let events = AccessLogReader::new().read_events(path)?;
        self.group(&events)
    }

    /// Match a user and recommend pages from the best cluster.
    pub fn recommend(&self, user: &PageVector, matrix: &ClusterMatrix) -> Result<RecommendationReport> {
        let matching = self.matcher.match_user(user, matrix)?;
        let recommendation = match matching.best {
            Some(best) => Some(self.selector.recommend(user, matrix, best.cluster_index)?),
            None => {
                warn!("Cluster matrix has no clusters; nothing to recommend");
                None
            }
        };
        Ok(RecommendationReport {
            matching,
            recommendation,
        })
    }
}
