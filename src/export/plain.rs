//! CSV export.

use std::io::Write;

use crate::error::Result;
use crate::export::TableExporter;
use crate::feature::table::DataTable;

/// Header line with the column names, then one line per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl TableExporter for CsvExporter {
    fn extension(&self) -> &'static str {
        ".csv"
    }

    fn write_table(&self, table: &DataTable, out: &mut dyn Write) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(table.column_names())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::table::{Column, ColumnKind, Value};

    #[test]
    fn test_csv_output() {
        let mut table = DataTable::new(
            "sessions",
            vec![
                Column::new("duration", ColumnKind::Integer),
                Column::new("average_request_duration", ColumnKind::Real),
                Column::new("/a,b", ColumnKind::Boolean),
            ],
        )
        .unwrap();
        table
            .push_row(vec![Value::Integer(100), Value::Real(100.0), Value::Boolean(false)])
            .unwrap();

        let mut buffer = Vec::new();
        CsvExporter.write_table(&table, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "duration,average_request_duration,\"/a,b\"\n100,100.0,False\n"
        );
    }
}
