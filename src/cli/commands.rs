//! Command implementations for the usage-miner CLI.

use std::path::{Path, PathBuf};

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::cluster::{ClusterMatrix, ClusterScore};
use crate::config::MiningConfig;
use crate::error::{MinerError, Result};
use crate::export::TableWriter;
use crate::feature::vector::PageVector;
use crate::pipeline::MiningPipeline;
use crate::synthetic::{parse_user_flags, random_user, seeded_random_user};

/// Execute a CLI command.
pub fn execute_command(args: MinerArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    match &args.command {
        Command::Filter(filter_args) => filter_log(filter_args, config, &args),
        Command::Group(group_args) => group_log(group_args, config, &args),
        Command::Recommend(recommend_args) => recommend_pages(recommend_args, config, &args),
    }
}

/// Load the configuration file, or the defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<MiningConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            MiningConfig::from_json_file(path)
        }
        None => Ok(MiningConfig::default()),
    }
}

/// Filter a raw access log.
fn filter_log(args: &FilterArgs, mut config: MiningConfig, cli_args: &MinerArgs) -> Result<()> {
    if args.all_rows {
        config = config.with_max_rows(None);
    } else if let Some(max_rows) = args.max_rows {
        config = config.with_max_rows(Some(max_rows));
    }

    info!("Filtering access log: {}", args.log_file.display());
    let pipeline = MiningPipeline::new(config)?;
    let output = pipeline.filter_log(&args.log_file)?;
    let table = output.to_table()?;

    let files = TableWriter::new(&args.output_dir, cli_args.export).write(&table)?;

    output_result(
        "Access log filtered successfully",
        &FilterResult {
            input: args.log_file.to_string_lossy().to_string(),
            rows_read: output.rows_read,
            rows_kept: output.records.len(),
            files: display_paths(&files),
        },
        cli_args,
    )
}

/// Sessionize a filtered log and write the feature tables.
fn group_log(args: &GroupArgs, mut config: MiningConfig, cli_args: &MinerArgs) -> Result<()> {
    if let Some(timeout) = args.timeout {
        config = config.with_session_timeout(timeout);
    }
    if let Some(threshold) = args.threshold {
        config = config.with_popularity_threshold(threshold);
    }
    if args.parallel {
        config = config.with_parallel(true);
    }
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    if args.flush_trailing {
        config = config.with_flush_trailing_session(true);
    }
    if args.no_timestamp {
        config = config.with_timestamp_suffix(false);
    }

    info!("Grouping filtered log: {}", args.log_file.display());
    let pipeline = MiningPipeline::new(config)?;
    let output = pipeline.group_log(&args.log_file)?;

    // Every table is built before the first file is created.
    let files = TableWriter::new(&args.output_dir, cli_args.export)
        .with_timestamp_suffix(pipeline.config().timestamp_suffix)
        .write_all(output.tables.iter())?;

    output_result(
        "Sessions grouped successfully",
        &GroupResult {
            input: args.log_file.to_string_lossy().to_string(),
            popular_pages: output.schema.len(),
            stats: output.sessionized.stats(),
            files: display_paths(&files),
        },
        cli_args,
    )
}

/// Match a user against the cluster matrix and print the recommendation.
fn recommend_pages(
    args: &RecommendArgs,
    config: MiningConfig,
    cli_args: &MinerArgs,
) -> Result<()> {
    let matrix = ClusterMatrix::from_path_with_header(&args.cluster_file, args.header)?;
    let user = resolve_user(args, &matrix)?;

    let pipeline = MiningPipeline::new(config)?;
    let report = pipeline.recommend(&user, &matrix)?;

    let name = |score: ClusterScore| NamedScore {
        cluster: matrix
            .cluster_names()
            .get(score.cluster_index)
            .cloned()
            .unwrap_or_default(),
        score,
    };

    let result = RecommendResult {
        cluster_file: args.cluster_file.to_string_lossy().to_string(),
        user: user.to_bools(),
        scores: report.matching.scores.iter().copied().map(name).collect(),
        best: report.matching.best.map(name),
        recommended: report
            .recommendation
            .map(|recommendation| recommendation.pages)
            .unwrap_or_default(),
    };
    output_recommendation(&result, cli_args)
}

/// The user vector from `--pages` or a random one.
fn resolve_user(args: &RecommendArgs, matrix: &ClusterMatrix) -> Result<PageVector> {
    if let Some(flags) = &args.user.pages {
        return parse_user_flags(flags).ok_or_else(|| {
            MinerError::invalid_argument(format!(
                "Invalid page flags '{flags}': expected comma-separated 0/1 values"
            ))
        });
    }

    let pages = args.pages_number.unwrap_or_else(|| matrix.page_count());
    let user = match args.seed {
        Some(seed) => seeded_random_user(pages, seed),
        None => random_user(pages, &mut rand::rng()),
    };
    info!("Generated random user with {} of {} pages visited", user.count_ones(), pages);
    Ok(user)
}

fn display_paths(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.to_string_lossy().to_string())
        .collect()
}
