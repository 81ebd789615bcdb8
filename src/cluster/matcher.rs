//! Jaccard scoring of a user against every cluster.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cluster::matrix::ClusterMatrix;
use crate::error::{MinerError, Result};
use crate::feature::vector::PageVector;

/// Cluster counts at or above this are scored on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 100;

/// Similarity of the user to one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterScore {
    pub cluster_index: usize,
    /// Jaccard coefficient in `[0, 1]`.
    pub score: f64,
}

/// Scores for all clusters plus the best match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// One score per cluster, in cluster order.
    pub scores: Vec<ClusterScore>,

    /// Highest score; the lowest cluster index wins ties.
    /// `None` only when the matrix has no clusters.
    pub best: Option<ClusterScore>,
}

/// Jaccard coefficient `|a ∩ b| / |a ∪ b|` of the true positions.
///
/// Two all-false vectors have similarity 0.
pub fn jaccard_similarity(a: &PageVector, b: &PageVector) -> Result<f64> {
    if a.len() != b.len() {
        return Err(MinerError::page_universe_mismatch(b.len(), a.len()));
    }
    let (intersection, union) = a.overlap(b)?;
    if union == 0 {
        return Ok(0.0);
    }
    Ok(intersection as f64 / union as f64)
}

/// Selects the cluster most similar to a user.
#[derive(Debug, Clone)]
pub struct ClusterSimilarityMatcher {
    parallel_threshold: usize,
}

impl Default for ClusterSimilarityMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterSimilarityMatcher {
    pub fn new() -> Self {
        ClusterSimilarityMatcher {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Set the cluster count from which scoring runs in parallel.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Score every cluster, in cluster order.
    ///
    /// Fails with `PageUniverseMismatch` before any scoring when the user vector
    /// does not have one entry per matrix page.
    pub fn score_clusters(
        &self,
        user: &PageVector,
        matrix: &ClusterMatrix,
    ) -> Result<Vec<ClusterScore>> {
        if user.len() != matrix.page_count() {
            return Err(MinerError::page_universe_mismatch(
                matrix.page_count(),
                user.len(),
            ));
        }

        let score = |(cluster_index, column): (usize, &PageVector)| {
            jaccard_similarity(user, column).map(|score| ClusterScore {
                cluster_index,
                score,
            })
        };

        if matrix.cluster_count() < self.parallel_threshold {
            return matrix.columns().iter().enumerate().map(score).collect();
        }

        matrix
            .columns()
            .par_iter()
            .enumerate()
            .map(score)
            .collect::<Result<Vec<_>>>()
    }

    /// Score every cluster and pick the best one.
    pub fn match_user(&self, user: &PageVector, matrix: &ClusterMatrix) -> Result<MatchResult> {
        let scores = self.score_clusters(user, matrix)?;
        let best = best_score(&scores);
        Ok(MatchResult { scores, best })
    }
}

/// First maximum of the scores.
fn best_score(scores: &[ClusterScore]) -> Option<ClusterScore> {
    let mut best: Option<ClusterScore> = None;
    for candidate in scores {
        match best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(*candidate),
        }
    }
    best
}
