//! Table export to disk.
//!
//! Every table can be written as plain CSV and as an ARFF dataset; both files
//! mirror the same in-memory [`DataTable`].

pub mod arff;
pub mod plain;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::ValueEnum;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::feature::table::DataTable;

pub use self::arff::ArffExporter;
pub use self::plain::CsvExporter;

/// Serializes a table into one file format.
pub trait TableExporter: Send + Sync {
    /// File extension including the dot.
    fn extension(&self) -> &'static str;

    /// Write the whole table to `out`.
    fn write_table(&self, table: &DataTable, out: &mut dyn Write) -> Result<()>;
}

/// Which files are produced per table.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// CSV only
    Plain,
    /// ARFF only
    Arff,
    /// CSV and ARFF
    #[default]
    Both,
}

impl ExportFormat {
    fn exporters(self) -> Vec<Box<dyn TableExporter>> {
        match self {
            ExportFormat::Plain => vec![Box::new(CsvExporter)],
            ExportFormat::Arff => vec![Box::new(ArffExporter)],
            ExportFormat::Both => vec![Box::new(CsvExporter), Box::new(ArffExporter)],
        }
    }
}

/// Writes tables into an output directory.
pub struct TableWriter {
    output_dir: PathBuf,
    exporters: Vec<Box<dyn TableExporter>>,
    timestamp_suffix: bool,
}

impl TableWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P, format: ExportFormat) -> Self {
        TableWriter {
            output_dir: output_dir.as_ref().to_path_buf(),
            exporters: format.exporters(),
            timestamp_suffix: false,
        }
    }

    /// Append `-HHMMSS` (local time) to every file name.
    pub fn with_timestamp_suffix(mut self, suffix: bool) -> Self {
        self.timestamp_suffix = suffix;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write one table in every configured format.
    pub fn write(&self, table: &DataTable) -> Result<Vec<PathBuf>> {
        self.write_all([table])
    }

    /// Write several tables; all files of one call share the same suffix.
    ///
    /// On failure every file this call created is removed again, so the
    /// output directory never holds a partial set.
    pub fn write_all<'a, I>(&self, tables: I) -> Result<Vec<PathBuf>>
    where
        I: IntoIterator<Item = &'a DataTable>,
    {
        fs::create_dir_all(&self.output_dir)?;
        let suffix = self
            .timestamp_suffix
            .then(|| Local::now().format("%H%M%S").to_string());

        let mut written = Vec::new();
        for table in tables {
            for exporter in &self.exporters {
                let path = self.output_dir.join(file_name(
                    table.name(),
                    exporter.extension(),
                    suffix.as_deref(),
                ));
                if let Err(e) = write_file(&path, table, exporter.as_ref()) {
                    remove_files(&written);
                    return Err(e);
                }
                info!("Wrote {} rows to {}", table.len(), path.display());
                written.push(path);
            }
        }
        Ok(written)
    }
}

/// Write one file, removing it again if the write fails after creation.
fn write_file(path: &Path, table: &DataTable, exporter: &dyn TableExporter) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    let result = exporter
        .write_table(table, &mut out)
        .and_then(|()| out.flush().map_err(Into::into));
    if result.is_err() {
        drop(out);
        remove_files(&[path.to_path_buf()]);
    }
    result
}

fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove {}: {e}", path.display());
        }
    }
}

/// `<name>[-<suffix>]<extension>` with spaces removed.
pub fn file_name(name: &str, extension: &str, suffix: Option<&str>) -> String {
    let mut file_name = name.to_string();
    if let Some(suffix) = suffix {
        file_name.push('-');
        file_name.push_str(suffix);
    }
    file_name.push_str(extension);
    file_name.retain(|c| c != ' ');
    file_name
}
