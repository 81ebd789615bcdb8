//! Command line argument parsing for the usage-miner CLI using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cluster::MatrixHeader;
use crate::export::ExportFormat;

/// usage-miner - web usage mining over HTTP access logs
#[derive(Parser, Debug, Clone)]
#[command(name = "usage-miner")]
#[command(about = "Sessionize access logs, build page features and recommend pages by cluster")]
#[command(version = crate::VERSION)]
#[command(long_about = None)]
pub struct MinerArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Files written per table
    #[arg(short = 'e', long = "export", default_value = "both", global = true)]
    pub export: ExportFormat,

    /// Mining configuration file (JSON); flags override its values
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl MinerArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Keep successful non-image GET requests of a raw access log
    Filter(FilterArgs),

    /// Sessionize a filtered log and write the feature tables
    Group(GroupArgs),

    /// Match a user against a cluster matrix and recommend pages
    Recommend(RecommendArgs),
}

/// Arguments for filtering a raw log
#[derive(Parser, Debug, Clone)]
pub struct FilterArgs {
    /// Raw access log (CSV with host,time,method,url,response)
    #[arg(value_name = "LOG_FILE")]
    pub log_file: PathBuf,

    /// Directory for the filtered log
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Maximum number of rows to read
    #[arg(short = 'n', long, conflicts_with = "all_rows")]
    pub max_rows: Option<usize>,

    /// Read the whole log
    #[arg(long)]
    pub all_rows: bool,
}

/// Arguments for grouping a filtered log into sessions
#[derive(Parser, Debug, Clone)]
pub struct GroupArgs {
    /// Filtered access log
    #[arg(value_name = "FILTERED_LOG")]
    pub log_file: PathBuf,

    /// Directory for the feature tables
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Session inactivity timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<i64>,

    /// Popularity threshold in percent of all requests
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Sessionize users in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Worker threads for parallel sessionization
    #[arg(long, requires = "parallel")]
    pub threads: Option<usize>,

    /// Emit each user's last open session
    #[arg(long)]
    pub flush_trailing: bool,

    /// Don't append the -HHMMSS suffix to file names
    #[arg(long)]
    pub no_timestamp: bool,
}

/// Arguments for recommending pages
#[derive(Parser, Debug, Clone)]
pub struct RecommendArgs {
    /// Cluster matrix file
    #[arg(value_name = "CLUSTER_FILE")]
    pub cluster_file: PathBuf,

    /// How the first line of the cluster file is read
    #[arg(long, default_value = "detect")]
    pub header: MatrixHeader,

    #[command(flatten)]
    pub user: UserSource,

    /// Number of pages of the random user (default: matrix page count)
    #[arg(short = 'n', long, requires = "random_user")]
    pub pages_number: Option<usize>,

    /// Seed for the random user
    #[arg(long, requires = "random_user")]
    pub seed: Option<u64>,
}

/// Where the user vector comes from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct UserSource {
    /// Visited flags, comma-separated (e.g. 1,0,1,0)
    #[arg(short, long, value_name = "FLAGS")]
    pub pages: Option<String>,

    /// Generate a random user
    #[arg(short, long)]
    pub random_user: bool,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
