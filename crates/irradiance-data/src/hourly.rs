//! Parser for NASA/POWER hourly CSV exports.
//!
//! The export starts with a free-text metadata block followed by a regular
//! comma-separated table whose header begins `YEAR,MO,DY,HR`. Irradiance is
//! read from the single `ALLSKY_SFC_*` column (prefix configurable) and scaled
//! into GHI.

use irradiance_core::error::{IrradianceError, Result};
use irradiance_core::models::{HourlyDataset, HourlyRecord};
use irradiance_core::settings::SchemaConfig;
use tracing::{debug, warn};

use crate::decode::{decode, TextEncoding};
use crate::extractor::{ExtractedTable, TableExtractor};
use crate::numeric::{coerce_f64, coerce_i32, coerce_u32};

const COL_YEAR: &str = "YEAR";
const COL_MONTH: &str = "MO";
const COL_DAY: &str = "DY";
const COL_HOUR: &str = "HR";

/// Positions of the columns the parser reads.
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    irradiance: usize,
    year: usize,
    month: usize,
    day: Option<usize>,
    hour: Option<usize>,
}

/// Parses and cleans the hourly source.
#[derive(Debug, Clone, Default)]
pub struct HourlySourceParser {
    schema: SchemaConfig,
}

impl HourlySourceParser {
    pub fn new(schema: SchemaConfig) -> Self {
        Self { schema }
    }

    /// Decode raw upload bytes (strict UTF-8) and parse them.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<HourlyDataset> {
        let text = decode(bytes, TextEncoding::Utf8)?;
        self.parse_text(&text)
    }

    /// Locate the `YEAR,MO,DY,HR` table inside `text` and parse it.
    pub fn parse_text(&self, text: &str) -> Result<HourlyDataset> {
        let table = TableExtractor::hourly().extract(text)?;
        self.parse_table(&table)
    }

    /// Parse an already extracted table.
    ///
    /// Non-numeric irradiance values become missing; rows missing a year, a
    /// month or an irradiance value are dropped, as are rows whose GHI is
    /// not finite.
    ///
    /// # Errors
    /// - [`IrradianceError::MissingColumn`] naming every required column that
    ///   is absent (`ALLSKY_SFC_*`, `YEAR`, `MO`).
    /// - [`IrradianceError::EmptyAfterCleaning`] when no row survives cleaning.
    /// - [`IrradianceError::Csv`] when the table is not readable as CSV.
    pub fn parse_table(&self, table: &ExtractedTable) -> Result<HourlyDataset> {
        let text = table.text();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let (layout, irradiance_column) = self.resolve_columns(&headers)?;

        let mut records: Vec<HourlyRecord> = Vec::new();
        let mut rows_read = 0usize;

        for result in reader.records() {
            let row = result?;
            rows_read += 1;
            if let Some(record) = self.map_row(&row, &layout) {
                records.push(record);
            }
        }

        debug!(
            "Hourly table at line {}: {} rows read, {} kept, {} dropped (column {})",
            table.start_line() + 1,
            rows_read,
            records.len(),
            rows_read - records.len(),
            irradiance_column
        );

        if records.is_empty() {
            return Err(IrradianceError::EmptyAfterCleaning);
        }

        Ok(HourlyDataset {
            irradiance_column,
            records,
        })
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn resolve_columns(&self, headers: &csv::StringRecord) -> Result<(ColumnLayout, String)> {
        let position = |name: &str| headers.iter().position(|h| h == name);
        let prefix = self.schema.irradiance_prefix.as_str();

        let irradiance_candidates: Vec<(usize, &str)> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.starts_with(prefix))
            .collect();
        if irradiance_candidates.len() > 1 {
            warn!(
                "Hourly table has {} columns starting with {}; using {}",
                irradiance_candidates.len(),
                prefix,
                irradiance_candidates[0].1
            );
        }

        let irradiance = irradiance_candidates.first().copied();
        let year = position(COL_YEAR);
        let month = position(COL_MONTH);

        let mut missing = Vec::new();
        if irradiance.is_none() {
            missing.push(format!("{}*", prefix));
        }
        if year.is_none() {
            missing.push(COL_YEAR.to_string());
        }
        if month.is_none() {
            missing.push(COL_MONTH.to_string());
        }

        match (irradiance, year, month) {
            (Some((irradiance, name)), Some(year), Some(month)) => Ok((
                ColumnLayout {
                    irradiance,
                    year,
                    month,
                    day: position(COL_DAY),
                    hour: position(COL_HOUR),
                },
                name.to_string(),
            )),
            _ => Err(IrradianceError::MissingColumn(missing)),
        }
    }

    fn map_row(&self, row: &csv::StringRecord, layout: &ColumnLayout) -> Option<HourlyRecord> {
        let year = row.get(layout.year).and_then(coerce_i32)?;
        let month = row.get(layout.month).and_then(coerce_u32)?;
        let raw_flux = row.get(layout.irradiance).and_then(coerce_f64)?;
        let ghi = Some(raw_flux / self.schema.flux_divisor).filter(|v| v.is_finite())?;

        Some(HourlyRecord {
            year,
            month,
            day: layout.day.and_then(|i| row.get(i)).and_then(coerce_u32),
            hour: layout.hour.and_then(|i| row.get(i)).and_then(coerce_u32),
            raw_flux,
            ghi,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> HourlySourceParser {
        HourlySourceParser::new(SchemaConfig::default())
    }

    fn export(body: &str) -> String {
        format!(
            "-BEGIN HEADER-\nNASA/POWER Hourly Data\nLocation: latitude 45.0 longitude 7.0\n-END HEADER-\n{}",
            body
        )
    }

    // ── Cleaning ──────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_scales_flux_into_ghi() {
        let text = export(
            "YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n\
             2020,1,1,12,500\n\
             2020,1,1,13,300\n\
             2021,1,1,12,400\n",
        );
        let dataset = parser().parse_text(&text).unwrap();

        assert_eq!(dataset.irradiance_column, "ALLSKY_SFC_SW_DWN");
        let ghi: Vec<f64> = dataset.records.iter().map(|r| r.ghi).collect();
        assert_eq!(ghi, vec![0.5, 0.3, 0.4]);
        assert_eq!(dataset.distinct_years(), 2);
        assert_eq!(dataset.records[0].day, Some(1));
        assert_eq!(dataset.records[0].hour, Some(12));
    }

    #[test]
    fn test_parse_drops_non_numeric_flux() {
        let text = export(
            "YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n\
             2020,1,1,12,500\n\
             2020,1,1,13,bad\n\
             2020,1,1,14,\n",
        );
        let dataset = parser().parse_text(&text).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].raw_flux, 500.0);
    }

    #[test]
    fn test_parse_drops_missing_year_or_month() {
        let text = export(
            "YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n\
             ,1,1,12,500\n\
             2020,,1,13,300\n\
             2020,2,1,14,100\n",
        );
        let dataset = parser().parse_text(&text).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].month, 2);
    }

    #[test]
    fn test_parse_all_rows_dropped_is_empty_after_cleaning() {
        let text = export("YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n2020,1,1,12,n/a\n");
        let err = parser().parse_text(&text).unwrap_err();
        assert!(matches!(err, IrradianceError::EmptyAfterCleaning));
    }

    #[test]
    fn test_parse_keeps_provider_fill_values() {
        // -999 is numeric, so it is scaled like any other value.
        let text = export("YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n2020,1,1,0,-999\n");
        let dataset = parser().parse_text(&text).unwrap();
        assert!((dataset.records[0].ghi + 0.999).abs() < 1e-12);
    }

    #[test]
    fn test_parse_drops_non_finite_ghi() {
        let text = export(
            "YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n\
             2020,1,1,12,inf\n\
             2020,1,1,13,1e309\n\
             2020,1,1,14,500\n",
        );
        let dataset = parser().parse_text(&text).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].hour, Some(14));
    }

    #[test]
    fn test_parse_zero_divisor_drops_every_row() {
        // An unvalidated schema must not leak NaN or infinite GHI.
        let schema = SchemaConfig {
            flux_divisor: 0.0,
            ..Default::default()
        };
        let text = export("YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n2020,1,1,12,0\n2020,1,1,13,500\n");
        let err = HourlySourceParser::new(schema).parse_text(&text).unwrap_err();
        assert!(matches!(err, IrradianceError::EmptyAfterCleaning));
    }

    #[test]
    fn test_parse_custom_divisor() {
        let schema = SchemaConfig {
            flux_divisor: 100.0,
            ..Default::default()
        };
        let text = export("YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n2020,1,1,12,500\n");
        let dataset = HourlySourceParser::new(schema).parse_text(&text).unwrap();
        assert_eq!(dataset.records[0].ghi, 5.0);
    }

    // ── Column validation ─────────────────────────────────────────────────────

    #[test]
    fn test_missing_year_column() {
        let text = "MO,DY,HR,ALLSKY_SFC_SW_DWN,YEAR_HR\n1,1,12,500,1\n";
        // The header still contains the substring YEAR, so extraction succeeds.
        let err = parser().parse_text(text).unwrap_err();
        match err {
            IrradianceError::MissingColumn(names) => assert_eq!(names, vec!["YEAR"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_all_missing_columns_reported_in_order() {
        // YEAR and MO only appear as substrings, so extraction still succeeds.
        let text = "DY,HR,T2M,YEAR_QC,MO_QC\n1,12,4.5,0,0\n";
        let err = parser().parse_text(text).unwrap_err();
        match err {
            IrradianceError::MissingColumn(names) => {
                assert_eq!(names, vec!["ALLSKY_SFC_*", "YEAR", "MO"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_irradiance_column() {
        let text = export("YEAR,MO,DY,HR,T2M\n2020,1,1,12,4.5\n");
        let err = parser().parse_text(&text).unwrap_err();
        match err {
            IrradianceError::MissingColumn(names) => assert_eq!(names, vec!["ALLSKY_SFC_*"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_prefix_reported_when_missing() {
        let schema = SchemaConfig {
            irradiance_prefix: "CLRSKY_SFC_".to_string(),
            ..Default::default()
        };
        let text = export("YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n2020,1,1,12,500\n");
        let err = HourlySourceParser::new(schema).parse_text(&text).unwrap_err();
        assert_eq!(err.to_string(), "Missing required columns: CLRSKY_SFC_*");
    }

    #[test]
    fn test_first_matching_irradiance_column_wins() {
        let text = export(
            "YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN,ALLSKY_SFC_LW_DWN\n2020,1,1,12,500,300\n",
        );
        let dataset = parser().parse_text(&text).unwrap();
        assert_eq!(dataset.irradiance_column, "ALLSKY_SFC_SW_DWN");
        assert_eq!(dataset.records[0].raw_flux, 500.0);
    }

    #[test]
    fn test_header_not_found() {
        let err = parser().parse_text("no table here\n").unwrap_err();
        assert!(matches!(err, IrradianceError::HeaderNotFound(_)));
    }

    // ── Decoding ──────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let mut bytes = b"YEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n2020,1,1,12,500\n".to_vec();
        bytes.push(0xFF);
        let err = parser().parse_bytes(&bytes).unwrap_err();
        assert!(matches!(err, IrradianceError::DecodeError(_)));
    }

    #[test]
    fn test_parse_bytes_with_bom() {
        let bytes = b"\xEF\xBB\xBFYEAR,MO,DY,HR,ALLSKY_SFC_SW_DWN\n2020,3,1,12,250\n";
        let dataset = parser().parse_bytes(bytes).unwrap();
        assert_eq!(dataset.records[0].month, 3);
        assert_eq!(dataset.records[0].ghi, 0.25);
    }
}
