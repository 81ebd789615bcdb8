//! Popular-page detection and the feature schema it defines.
//!
//! A page is popular when its share of all requests in the corpus is strictly
//! above the configured percentage. The popular pages, in descending request
//! count, form the [`PopularitySchema`]: the column order and dimensionality of
//! every page vector produced from that corpus.

use ahash::AHashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::access_log::RequestEvent;
use crate::config::DEFAULT_POPULARITY_THRESHOLD;
use crate::error::{MinerError, Result};
use crate::feature::vector::PageVector;

/// Access statistics of one popular page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFrequency {
    pub url: String,
    pub count: u64,
    /// `100 * count / total_requests`
    pub percent: f64,
}

/// Ordered, duplicate-free set of popular pages.
///
/// Built once per corpus and shared read-only (usually behind an `Arc`) by every
/// session and user derived from that corpus.
#[derive(Debug, Clone, Default)]
pub struct PopularitySchema {
    pages: Vec<PageFrequency>,
    index: AHashMap<String, usize>,
}

impl PopularitySchema {
    /// Build a schema from pages already in their final order.
    pub fn from_pages(pages: Vec<PageFrequency>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(pages.len());
        for (position, page) in pages.iter().enumerate() {
            if index.insert(page.url.clone(), position).is_some() {
                return Err(MinerError::invalid_argument(format!(
                    "Duplicate page in popularity schema: {}",
                    page.url
                )));
            }
        }
        Ok(PopularitySchema { pages, index })
    }

    /// Build a schema from bare URLs, e.g. for tests or a fixed page list.
    pub fn from_urls<I, S>(urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages = urls
            .into_iter()
            .map(|url| PageFrequency {
                url: url.into(),
                count: 0,
                percent: 0.0,
            })
            .collect();
        Self::from_pages(pages)
    }

    /// Number of popular pages, i.e. the page-vector length.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Vector position of `url`, if it is popular.
    pub fn position(&self, url: &str) -> Option<usize> {
        self.index.get(url).copied()
    }

    /// URL at `position`.
    pub fn url(&self, position: usize) -> Option<&str> {
        self.pages.get(position).map(|p| p.url.as_str())
    }

    /// URLs in schema order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|p| p.url.as_str())
    }

    /// Page statistics in schema order.
    pub fn pages(&self) -> &[PageFrequency] {
        &self.pages
    }

    /// A fresh all-false vector sized to this schema.
    pub fn empty_vector(&self) -> PageVector {
        PageVector::new(self.pages.len())
    }

    /// Fail with `SchemaMismatch` unless `vector` has one entry per page.
    pub fn check_vector(&self, vector: &PageVector) -> Result<()> {
        if vector.len() != self.len() {
            return Err(MinerError::schema_mismatch(self.len(), vector.len()));
        }
        Ok(())
    }
}

/// Computes the popularity schema of a request corpus.
#[derive(Debug, Clone)]
pub struct PopularityAnalyzer {
    threshold: f64,
}

impl Default for PopularityAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_POPULARITY_THRESHOLD)
    }
}

impl PopularityAnalyzer {
    /// Create an analyzer keeping pages above `threshold` percent of requests.
    pub fn new(threshold: f64) -> Self {
        PopularityAnalyzer { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Build the schema from request events.
    pub fn analyze(&self, events: &[RequestEvent]) -> PopularitySchema {
        self.analyze_urls(events.iter().map(|e| e.url.as_str()))
    }

    /// Build the schema from a sequence of requested URLs.
    ///
    /// Pages are ordered by descending count; equal counts keep the order in
    /// which the pages first appear in the corpus.
    pub fn analyze_urls<'a, I>(&self, urls: I) -> PopularitySchema
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: Vec<(&'a str, u64)> = Vec::new();
        let mut seen: AHashMap<&'a str, usize> = AHashMap::new();
        let mut total: u64 = 0;

        for url in urls {
            total += 1;
            match seen.get(url) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    seen.insert(url, counts.len());
                    counts.push((url, 1));
                }
            }
        }

        // Stable sort keeps first-appearance order among equal counts.
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let pages: Vec<PageFrequency> = counts
            .into_iter()
            .map(|(url, count)| PageFrequency {
                url: url.to_string(),
                count,
                percent: 100.0 * count as f64 / total as f64,
            })
            .filter(|page| page.percent > self.threshold)
            .collect();

        info!(
            "{} of {} distinct pages are above {}% of {} requests",
            pages.len(),
            seen.len(),
            self.threshold,
            total
        );

        let index = pages
            .iter()
            .enumerate()
            .map(|(position, page)| (page.url.clone(), position))
            .collect();
        let schema = PopularitySchema { pages, index };
        debug!("Popularity schema: {:?}", schema.urls().collect::<Vec<_>>());
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(urls: &[&str]) -> Vec<RequestEvent> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| RequestEvent::new("u", i as i64, *url))
            .collect()
    }

    #[test]
    fn test_threshold_is_strict() {
        // 4 requests: A = 50%, B = 25%, C = 25%
        let corpus = events(&["A", "B", "A", "C"]);
        let schema = PopularityAnalyzer::new(25.0).analyze(&corpus);
        assert_eq!(schema.urls().collect::<Vec<_>>(), vec!["A"]);

        let schema = PopularityAnalyzer::new(24.9).analyze(&corpus);
        assert_eq!(schema.urls().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_descending_frequency_with_stable_ties() {
        let corpus = events(&["C", "B", "A", "B", "A", "A"]);
        let schema = PopularityAnalyzer::default().analyze(&corpus);
        assert_eq!(schema.urls().collect::<Vec<_>>(), vec!["A", "B", "C"]);

        let corpus = events(&["Y", "X", "Z", "X", "Y"]);
        let schema = PopularityAnalyzer::default().analyze(&corpus);
        assert_eq!(schema.urls().collect::<Vec<_>>(), vec!["Y", "X", "Z"]);
    }

    #[test]
    fn test_percentages() {
        let corpus = events(&["A", "A", "A", "B"]);
        let schema = PopularityAnalyzer::default().analyze(&corpus);
        assert_eq!(schema.pages()[0].count, 3);
        assert!((schema.pages()[0].percent - 75.0).abs() < 1e-9);
        assert!((schema.pages()[1].percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_threshold_drops_rare_pages() {
        // 1 request of 201 is below 0.5%
        let mut urls = vec!["common"; 200];
        urls.push("rare");
        let schema = PopularityAnalyzer::default().analyze(&events(&urls));
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.position("rare"), None);
    }

    #[test]
    fn test_empty_corpus() {
        let schema = PopularityAnalyzer::default().analyze(&[]);
        assert!(schema.is_empty());
        assert_eq!(schema.empty_vector().len(), 0);
    }

    #[test]
    fn test_positions_match_order() {
        let schema = PopularitySchema::from_urls(["A", "B", "C"]).unwrap();
        assert_eq!(schema.position("A"), Some(0));
        assert_eq!(schema.position("C"), Some(2));
        assert_eq!(schema.url(1), Some("B"));
        assert_eq!(schema.position("D"), None);
    }

    #[test]
    fn test_duplicate_urls_rejected() {
        assert!(PopularitySchema::from_urls(["A", "B", "A"]).is_err());
    }

    #[test]
    fn test_check_vector() {
        let schema = PopularitySchema::from_urls(["A", "B"]).unwrap();
        assert!(schema.check_vector(&PageVector::new(2)).is_ok());
        assert!(matches!(
            schema.check_vector(&PageVector::new(3)),
            Err(MinerError::SchemaMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }
}
