//! Cluster-membership matrix and its text format.
//!
//! The matrix is read from whitespace-delimited lines:
//!
//! ```text
//! page        label     c0  c1  c2
//! /index.html home      1   0   1
//! /news       news      0   0   1
//! ```
//!
//! The first column is the page id, the second a label that is kept but not
//! used for matching, and every further column is one cluster flag. Blank
//! lines and lines starting with `#` are skipped. The first remaining line
//! may be a header naming the clusters; see [`MatrixHeader`].

use std::fs;
use std::path::Path;

use ahash::AHashSet;
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{MinerError, Result};
use crate::feature::vector::{PageVector, parse_flag};

/// Page id that marks a header line under [`MatrixHeader::Detect`].
pub const HEADER_PAGE_ID: &str = "page";

/// How the first non-comment line of a matrix file is read.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixHeader {
    /// Header when its page id is `page` or its cluster cells are not flags
    #[default]
    Detect,
    /// The first line always names the clusters
    Present,
    /// Every line is a page row
    Absent,
}

/// Pages by clusters, one boolean column per cluster. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterMatrix {
    pages: Vec<String>,
    labels: Vec<String>,
    cluster_names: Vec<String>,
    columns: Vec<PageVector>,
}

impl ClusterMatrix {
    /// Assemble a matrix from its parts, checking that all dimensions agree.
    pub fn new(
        pages: Vec<String>,
        labels: Vec<String>,
        cluster_names: Vec<String>,
        columns: Vec<PageVector>,
    ) -> Result<Self> {
        if labels.len() != pages.len() {
            return Err(MinerError::invalid_argument(format!(
                "Cluster matrix has {} pages but {} labels",
                pages.len(),
                labels.len()
            )));
        }
        if cluster_names.len() != columns.len() {
            return Err(MinerError::invalid_argument(format!(
                "Cluster matrix has {} columns but {} cluster names",
                columns.len(),
                cluster_names.len()
            )));
        }
        if let Some((index, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != pages.len())
        {
            return Err(MinerError::invalid_argument(format!(
                "Cluster column {index} has {} rows but the matrix has {} pages",
                column.len(),
                pages.len()
            )));
        }
        let mut seen = AHashSet::with_capacity(pages.len());
        for page in &pages {
            if !seen.insert(page.as_str()) {
                return Err(MinerError::invalid_argument(format!(
                    "Duplicate page '{page}' in cluster matrix"
                )));
            }
        }

        Ok(ClusterMatrix {
            pages,
            labels,
            cluster_names,
            columns,
        })
    }

    /// Build a matrix from page ids and row-major flags (`rows[page][cluster]`).
    pub fn from_rows(pages: Vec<String>, rows: &[Vec<bool>]) -> Result<Self> {
        if rows.len() != pages.len() {
            return Err(MinerError::invalid_argument(format!(
                "Cluster matrix has {} pages but {} rows",
                pages.len(),
                rows.len()
            )));
        }
        let cluster_count = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().position(|r| r.len() != cluster_count) {
            return Err(MinerError::invalid_argument(format!(
                "Cluster matrix row {row} has {} cells, expected {cluster_count}",
                rows[row].len()
            )));
        }

        let columns: Vec<PageVector> = (0..cluster_count)
            .map(|c| rows.iter().map(|row| row[c]).collect())
            .collect();
        let labels = vec![String::new(); pages.len()];
        Self::new(pages, labels, default_cluster_names(cluster_count), columns)
    }

    /// Read a matrix file, detecting a header line.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_path_with_header(path, MatrixHeader::Detect)
    }

    /// Read a matrix file with explicit header handling.
    pub fn from_path_with_header<P: AsRef<Path>>(path: P, header: MatrixHeader) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let matrix = Self::parse_with_header(&content, header)?;
        debug!(
            "Loaded cluster matrix {}: {} pages x {} clusters",
            path.display(),
            matrix.page_count(),
            matrix.cluster_count()
        );
        Ok(matrix)
    }

    /// Parse the whitespace-delimited text format, detecting a header line.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_header(text, MatrixHeader::Detect)
    }

    /// Parse the whitespace-delimited text format.
    pub fn parse_with_header(text: &str, header: MatrixHeader) -> Result<Self> {
        let mut first_line = true;
        let mut pages = Vec::new();
        let mut labels = Vec::new();
        let mut rows: Vec<Vec<bool>> = Vec::new();
        let mut cluster_names: Option<Vec<String>> = None;
        let mut width: Option<usize> = None;

        for (line_index, line) in text.lines().enumerate() {
            let line_number = line_index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if tokens.len() < 2 {
                return Err(MinerError::parse(format!(
                    "Cluster matrix line {line_number}: expected a page id and a label"
                )));
            }
            let cells = &tokens[2..];
            let flags: Option<Vec<bool>> = cells.iter().map(|cell| parse_flag(cell)).collect();

            let is_header = first_line
                && match header {
                    MatrixHeader::Present => true,
                    MatrixHeader::Absent => false,
                    MatrixHeader::Detect => {
                        tokens[0].eq_ignore_ascii_case(HEADER_PAGE_ID) || flags.is_none()
                    }
                };
            first_line = false;
            if is_header {
                cluster_names = Some(cells.iter().map(|c| c.to_string()).collect());
                width = Some(cells.len());
                continue;
            }

            let flags = flags.ok_or_else(|| {
                MinerError::parse(format!(
                    "Cluster matrix line {line_number}: cluster cells must be 0/1 or true/false"
                ))
            })?;

            let expected = *width.get_or_insert(flags.len());
            if flags.len() != expected {
                return Err(MinerError::parse(format!(
                    "Cluster matrix line {line_number}: expected {expected} cluster cells, found {}",
                    flags.len()
                )));
            }

            pages.push(tokens[0].to_string());
            labels.push(tokens[1].to_string());
            rows.push(flags);
        }

        let cluster_count = width.unwrap_or(0);
        let columns: Vec<PageVector> = (0..cluster_count)
            .map(|c| rows.iter().map(|row| row[c]).collect())
            .collect();
        let cluster_names = cluster_names.unwrap_or_else(|| default_cluster_names(cluster_count));

        Self::new(pages, labels, cluster_names, columns).map_err(|e| match e {
            MinerError::InvalidArgument(message) => MinerError::Parse(message),
            other => other,
        })
    }

    /// Number of pages (rows).
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of clusters (columns).
    pub fn cluster_count(&self) -> usize {
        self.columns.len()
    }

    /// Page ids in row order.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn cluster_names(&self) -> &[String] {
        &self.cluster_names
    }

    /// Membership column of one cluster.
    pub fn column(&self, cluster_index: usize) -> Option<&PageVector> {
        self.columns.get(cluster_index)
    }

    pub fn columns(&self) -> &[PageVector] {
        &self.columns
    }
}

fn default_cluster_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("cluster{i}")).collect()
}
