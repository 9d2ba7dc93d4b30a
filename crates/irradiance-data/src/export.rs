//! CSV serialization of derived tables.
//!
//! Every export has a header row of column names and is UTF-8 encoded. The
//! leading index column is optional; when present its header is the table's
//! index name (empty for pivots and positional indices).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use irradiance_core::error::{IrradianceError, Result};
use irradiance_core::table::Table;
use tracing::debug;

/// Write `table` as CSV to `writer`.
pub fn write_csv<W: Write>(table: &Table, writer: W, include_index: bool) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header: Vec<&str> = Vec::with_capacity(table.columns.len() + 1);
    if include_index {
        header.push(table.index_name.as_str());
    }
    header.extend(table.columns.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record: Vec<String> = Vec::with_capacity(row.cells.len() + 1);
        if include_index {
            record.push(row.index.clone());
        }
        record.extend(row.cells.iter().map(|c| c.to_field()));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Serialize `table` to an in-memory CSV document.
pub fn to_csv_bytes(table: &Table, include_index: bool) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf, include_index)?;
    Ok(buf)
}

/// Write `table` to the file at `path`, replacing any existing file.
pub fn write_csv_file(table: &Table, path: &Path, include_index: bool) -> Result<()> {
    let file = File::create(path).map_err(|source| IrradianceError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(table, file, include_index)?;
    debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use irradiance_core::models::{MonthlyYearTotal, Pivot};
    use irradiance_core::table::Cell;
    use tempfile::TempDir;

    fn year_totals() -> Table {
        let rows = vec![
            MonthlyYearTotal { year: 2020, month: 1, total_ghi: 0.8 },
            MonthlyYearTotal { year: 2021, month: 1, total_ghi: 0.4 },
        ];
        Table::from(rows.as_slice())
    }

    fn as_text(table: &Table, include_index: bool) -> String {
        String::from_utf8(to_csv_bytes(table, include_index).unwrap()).unwrap()
    }

    #[test]
    fn test_export_without_index() {
        assert_eq!(
            as_text(&year_totals(), false),
            "Year,Month,Total GHI (kW/m^2)\n2020,1,0.8\n2021,1,0.4\n"
        );
    }

    #[test]
    fn test_export_with_index() {
        assert_eq!(
            as_text(&year_totals(), true),
            ",Year,Month,Total GHI (kW/m^2)\n0,2020,1,0.8\n1,2021,1,0.4\n"
        );
    }

    #[test]
    fn test_export_pivot_missing_cells_are_empty() {
        let pivot = Pivot::from_cells(vec![(1, 2020, Some(0.8)), (2, 2021, Some(0.4))]);
        assert_eq!(
            as_text(&Table::from(&pivot), true),
            ",2020,2021\n1,0.8,\n2,,0.4\n"
        );
    }

    #[test]
    fn test_export_quotes_fields_with_commas() {
        let mut table = Table::new(vec!["name".to_string()]);
        table.push_positional(vec![Cell::Text("a,b".to_string())]);
        assert_eq!(as_text(&table, false), "name\n\"a,b\"\n");
    }

    #[test]
    fn test_export_empty_table_has_header_only() {
        let table = Table::new(vec!["Month".to_string(), "H_Gh".to_string()]);
        assert_eq!(as_text(&table, false), "Month,H_Gh\n");
    }

    #[test]
    fn test_write_csv_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("totals.csv");
        write_csv_file(&year_totals(), &path, false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Year,Month,Total GHI (kW/m^2)\n"));
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_write_csv_file_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("totals.csv");
        let err = write_csv_file(&year_totals(), &path, false).unwrap_err();
        assert!(matches!(err, IrradianceError::FileAccess { .. }));
    }
}
