use std::fs;
use std::path::Path;

use tempfile::TempDir;
use usage_miner::config::MiningConfig;
use usage_miner::error::MinerError;
use usage_miner::export::{ExportFormat, TableWriter};
use usage_miner::pipeline::MiningPipeline;

const RAW_LOG: &str = "\
host,time,method,url,response
10.0.0.1,01/Jul/1995:00:00:00 -0400,GET,/index.html,200
10.0.0.1,01/Jul/1995:00:01:40 -0400,GET,/news.html,200
10.0.0.1,01/Jul/1995:00:01:45 -0400,GET,/images/logo.GIF,200
10.0.0.2,01/Jul/1995:00:02:00 -0400,GET,/index.html,404
10.0.0.2,01/Jul/1995:00:03:00 -0400,POST,/form,200
10.0.0.1,01/Jul/1995:01:23:20 -0400,GET,/sport.html,200
10.0.0.3,01/Jul/1995:00:00:10 -0400,GET,/index.html,200
10.0.0.3,01/Jul/1995:00:05:10 -0400,GET,/sport.html,200
10.0.0.3,01/Jul/1995:00:09:10 -0400,GET,/index.html,200
";

fn write_log(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("access_log.csv");
    fs::write(&path, RAW_LOG).unwrap();
    path
}

#[test]
fn test_filter_then_group_through_files() {
    let dir = TempDir::new().unwrap();
    let log = write_log(dir.path());
    let out = dir.path().join("out");

    let pipeline = MiningPipeline::new(MiningConfig::default().with_timestamp_suffix(false)).unwrap();

    let filtered = pipeline.filter_log(&log).unwrap();
    assert_eq!(filtered.rows_read, 9);
    assert_eq!(filtered.records.len(), 6);
    let files = TableWriter::new(&out, ExportFormat::Both)
        .write(&filtered.to_table().unwrap())
        .unwrap();
    assert_eq!(files.len(), 2);

    let grouped = pipeline.group_log(out.join("filtered_logs.csv")).unwrap();
    assert_eq!(grouped.schema.len(), 3);
    // Most requested first.
    assert_eq!(
        grouped.schema.urls().collect::<Vec<_>>(),
        vec!["/index.html", "/sport.html", "/news.html"]
    );

    let stats = grouped.sessionized.stats();
    assert_eq!(stats.users, 2);
    assert_eq!(stats.requests, 6);
    // 10.0.0.1: [0, 100] emitted, [5000] unflushed. 10.0.0.3: one open session.
    assert_eq!(stats.sessions, 1);
    assert_eq!(stats.unflushed_requests, 4);

    let written = TableWriter::new(&out, ExportFormat::Plain)
        .write_all(grouped.tables.iter())
        .unwrap();
    assert_eq!(written.len(), 5);

    let users = fs::read_to_string(out.join("users.csv")).unwrap();
    assert_eq!(
        users,
        "request_count,/index.html,/sport.html,/news.html\n\
         3,True,True,True\n\
         3,True,True,False\n"
    );
}

#[test]
fn test_filtered_log_arff() {
    let dir = TempDir::new().unwrap();
    let log = write_log(dir.path());

    let pipeline = MiningPipeline::new(MiningConfig::default()).unwrap();
    let filtered = pipeline.filter_log(&log).unwrap();
    TableWriter::new(dir.path(), ExportFormat::Arff)
        .write(&filtered.to_table().unwrap())
        .unwrap();

    let arff = fs::read_to_string(dir.path().join("filtered_logs.arff")).unwrap();
    assert!(arff.starts_with("@RELATION filtered_logs\n"));
    assert!(arff.contains("@ATTRIBUTE response INTEGER\n"));
    assert!(arff.contains("10.0.0.1,'01/Jul/1995:00:00:00 -0400',GET,/index.html,200\n"));
    assert!(!dir.path().join("filtered_logs.csv").exists());
}

#[test]
fn test_max_rows_caps_the_read() {
    let dir = TempDir::new().unwrap();
    let log = write_log(dir.path());

    let pipeline = MiningPipeline::new(MiningConfig::default().with_max_rows(Some(3))).unwrap();
    let filtered = pipeline.filter_log(&log).unwrap();
    assert_eq!(filtered.rows_read, 3);
    assert_eq!(filtered.records.len(), 2);
}

#[test]
fn test_malformed_log_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("filtered.csv");
    fs::write(
        &log,
        "host,time,method,url,response\n\
         a,0,GET,/x,200\n\
         a,not-a-time,GET,/y,200\n",
    )
    .unwrap();

    let pipeline = MiningPipeline::new(MiningConfig::default()).unwrap();
    let result = pipeline.group_log(&log);
    assert!(matches!(result, Err(MinerError::Parse(_))));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_config_file_drives_the_pipeline() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("mining.json");
    fs::write(
        &config_path,
        r#"{ "session_timeout_secs": 6000, "flush_trailing_session": true }"#,
    )
    .unwrap();
    let config = MiningConfig::from_json_file(&config_path).unwrap();
    assert_eq!(config.popularity_threshold, 0.5);

    let log = write_log(dir.path());
    let pipeline = MiningPipeline::new(config).unwrap();
    let events: Vec<_> = pipeline
        .filter_log(&log)
        .unwrap()
        .records
        .iter()
        .map(|r| r.to_event().unwrap())
        .collect();
    let grouped = pipeline.group(&events).unwrap();

    // With a 100 minute timeout every user is a single flushed session.
    assert_eq!(grouped.sessionized.stats().sessions, 2);
    assert_eq!(grouped.sessionized.stats().unflushed_requests, 0);
}
