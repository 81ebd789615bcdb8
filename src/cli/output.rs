//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{MinerArgs, OutputFormat};
use crate::cluster::ClusterScore;
use crate::error::Result;
use crate::session::SessionizeStats;

/// Result structure for log filtering.
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterResult {
    pub input: String,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub files: Vec<String>,
}

/// Result structure for grouping.
#[derive(Debug, Serialize)]
pub struct GroupResult {
    pub input: String,
    pub popular_pages: usize,
    #[serde(flatten)]
    pub stats: SessionizeStats,
    pub files: Vec<String>,
}

/// Score of one cluster, with its name.
#[derive(Debug, Serialize, Deserialize)]
pub struct NamedScore {
    pub cluster: String,
    #[serde(flatten)]
    pub score: ClusterScore,
}

/// Result structure for a recommendation.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResult {
    pub cluster_file: String,
    pub user: Vec<bool>,
    pub scores: Vec<NamedScore>,
    pub best: Option<NamedScore>,
    pub recommended: Vec<String>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &MinerArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output a recommendation; the human form lists scores and pages.
pub fn output_recommendation(result: &RecommendResult, args: &MinerArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            output_recommendation_human(result, args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &MinerArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(&val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(&value);
            println!("{formatted_value}");
        }
    }
    Ok(())
}

fn output_recommendation_human(result: &RecommendResult, args: &MinerArgs) {
    if args.verbosity() > 1 {
        let flags: Vec<&str> = result
            .user
            .iter()
            .map(|&f| if f { "1" } else { "0" })
            .collect();
        println!("User: {}", flags.join(","));
        println!();
    }

    if result.scores.is_empty() {
        println!("Cluster matrix {} has no clusters", result.cluster_file);
        return;
    }

    println!("Cluster Scores:");
    println!("═══════════════");
    for named in &result.scores {
        println!("{:<20} {:.4}", named.cluster, named.score.score);
    }
    println!();

    if let Some(best) = &result.best {
        println!(
            "Best cluster: {} (#{}, score {:.4})",
            best.cluster, best.score.cluster_index, best.score.score
        );
    }

    if result.recommended.is_empty() {
        println!("No pages to recommend");
    } else {
        println!("Recommended pages:");
        for page in &result.recommended {
            println!("  {page}");
        }
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &MinerArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}
