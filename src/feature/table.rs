//! Typed in-memory tables.

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{MinerError, Result};

/// Type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer,
    Real,
    Boolean,
    Text,
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Column {
            name: name.into(),
            kind,
        }
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Value::Integer(_) => ColumnKind::Integer,
            Value::Real(_) => ColumnKind::Real,
            Value::Boolean(_) => ColumnKind::Boolean,
            Value::Text(_) => ColumnKind::Text,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            // Whole reals keep a decimal point so they read back as reals.
            Value::Real(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A named table with a fixed column layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTable {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    /// Create an empty table. Column names must be unique.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        let mut seen = AHashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(MinerError::invalid_argument(format!(
                    "Duplicate column '{}' in table '{name}'",
                    column.name
                )));
            }
        }
        Ok(DataTable {
            name,
            columns,
            rows: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row; its cells must match the column layout.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(MinerError::invalid_argument(format!(
                "Row has {} cells but table '{}' has {} columns",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }
        for (cell, column) in row.iter().zip(&self.columns) {
            if cell.kind() != column.kind {
                return Err(MinerError::invalid_argument(format!(
                    "Column '{}' of table '{}' expects {:?}, got {:?}",
                    column.name,
                    self.name,
                    column.kind,
                    cell.kind()
                )));
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// New table holding only the named columns, in the given order.
    pub fn select(&self, name: impl Into<String>, columns: &[&str]) -> Result<DataTable> {
        let indices = columns
            .iter()
            .map(|column| {
                self.column_index(column).ok_or_else(|| {
                    MinerError::invalid_argument(format!(
                        "Unknown column '{column}' in table '{}'",
                        self.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.project(name.into(), &indices))
    }

    /// New table without the named columns, remaining columns in order.
    pub fn drop_columns(&self, name: impl Into<String>, columns: &[&str]) -> Result<DataTable> {
        for column in columns {
            if self.column_index(column).is_none() {
                return Err(MinerError::invalid_argument(format!(
                    "Unknown column '{column}' in table '{}'",
                    self.name
                )));
            }
        }
        let indices: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !columns.contains(&self.columns[i].name.as_str()))
            .collect();
        Ok(self.project(name.into(), &indices))
    }

    fn project(&self, name: String, indices: &[usize]) -> DataTable {
        DataTable {
            name,
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }
}
