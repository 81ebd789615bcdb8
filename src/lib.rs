//! # usage-miner
//!
//! Web usage mining over HTTP access logs.
//!
//! ## Features
//!
//! - Access log ingestion with GET/200/non-image filtering
//! - Popularity schema of frequently requested pages
//! - Per-user sessionization with an inactivity timeout
//! - Session and user feature tables exported as CSV and ARFF
//! - Jaccard matching of users against a cluster matrix and page recommendation

pub mod access_log;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod export;
pub mod feature;
pub mod pipeline;
pub mod popularity;
pub mod session;
pub mod synthetic;

pub mod prelude {
    pub use crate::access_log::{AccessRecord, RequestEvent, RequestFilter};
    pub use crate::cluster::{
        ClusterMatrix, ClusterSimilarityMatcher, Recommendation, RecommendationSelector,
        jaccard_similarity,
    };
    pub use crate::config::MiningConfig;
    pub use crate::error::{MinerError, Result};
    pub use crate::feature::{DataTable, FeatureVectorBuilder, PageVector};
    pub use crate::pipeline::MiningPipeline;
    pub use crate::popularity::{PopularityAnalyzer, PopularitySchema};
    pub use crate::session::Sessionizer;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
