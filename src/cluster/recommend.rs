//! Recommendation of pages from a matched cluster.

use serde::{Deserialize, Serialize};

use crate::cluster::matrix::ClusterMatrix;
use crate::error::{MinerError, Result};
use crate::feature::vector::PageVector;

/// Pages of the matched cluster that the user has not visited.
///
/// An empty recommendation is a normal outcome: the user already covers every
/// page of the cluster, or the cluster visits nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub cluster_index: usize,
    /// Page ids in matrix row order.
    pub pages: Vec<String>,
}

impl Recommendation {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }
}

/// Derives recommendation sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationSelector;

impl RecommendationSelector {
    pub fn new() -> Self {
        RecommendationSelector
    }

    /// Pages flagged in `cluster` but not in `user`, taken from the aligned
    /// `pages` sequence.
    pub fn select(
        &self,
        user: &PageVector,
        cluster: &PageVector,
        pages: &[String],
    ) -> Result<Vec<String>> {
        if user.len() != pages.len() {
            return Err(MinerError::page_universe_mismatch(pages.len(), user.len()));
        }
        if cluster.len() != pages.len() {
            return Err(MinerError::invalid_argument(format!(
                "Cluster column has {} entries but there are {} pages",
                cluster.len(),
                pages.len()
            )));
        }

        Ok(cluster
            .ones()
            .filter(|&i| !user.get(i))
            .map(|i| pages[i].clone())
            .collect())
    }

    /// Recommendation from column `cluster_index` of `matrix`.
    pub fn recommend(
        &self,
        user: &PageVector,
        matrix: &ClusterMatrix,
        cluster_index: usize,
    ) -> Result<Recommendation> {
        let cluster = matrix.column(cluster_index).ok_or_else(|| {
            MinerError::invalid_argument(format!(
                "Cluster index {cluster_index} out of range for {} clusters",
                matrix.cluster_count()
            ))
        })?;
        let pages = self.select(user, cluster, matrix.pages())?;
        Ok(Recommendation {
            cluster_index,
            pages,
        })
    }
}
