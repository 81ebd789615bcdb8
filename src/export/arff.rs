//! ARFF (attribute-relation file format) export.

use std::io::Write;

use crate::error::Result;
use crate::export::TableExporter;
use crate::feature::table::{ColumnKind, DataTable, Value};

/// Writes `@RELATION`, one `@ATTRIBUTE` per column and the `@DATA` section.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArffExporter;

impl TableExporter for ArffExporter {
    fn extension(&self) -> &'static str {
        ".arff"
    }

    fn write_table(&self, table: &DataTable, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "@RELATION {}", quote(table.name()))?;
        writeln!(out)?;
        for column in table.columns() {
            writeln!(
                out,
                "@ATTRIBUTE {} {}",
                quote(&column.name),
                attribute_type(column.kind)
            )?;
        }
        writeln!(out)?;
        writeln!(out, "@DATA")?;
        for row in table.rows() {
            let cells: Vec<String> = row.iter().map(format_cell).collect();
            writeln!(out, "{}", cells.join(","))?;
        }
        Ok(())
    }
}

fn attribute_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer => "INTEGER",
        ColumnKind::Real => "REAL",
        ColumnKind::Boolean => "{False,True}",
        ColumnKind::Text => "STRING",
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Text(text) => quote(text),
        other => other.to_string(),
    }
}

/// Single-quote names and strings that are not plain tokens.
fn quote(text: &str) -> String {
    let plain = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'));
    if plain {
        return text.to_string();
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}
