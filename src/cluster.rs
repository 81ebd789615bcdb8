//! Cluster matching and recommendation.
//!
//! A precomputed [`ClusterMatrix`] holds, for each behavioral cluster, the pages
//! its representative member visits. [`ClusterSimilarityMatcher`] scores a user
//! page vector against every cluster with the Jaccard coefficient and picks the
//! best one; [`RecommendationSelector`] then lists the cluster's pages the user
//! has not visited yet.

pub mod matcher;
pub mod matrix;
pub mod recommend;

pub use self::matcher::{ClusterScore, ClusterSimilarityMatcher, MatchResult, jaccard_similarity};
pub use self::matrix::{ClusterMatrix, MatrixHeader};
pub use self::recommend::{Recommendation, RecommendationSelector};
