//! Parser for monthly irradiance reports.
//!
//! The report is free text with a whitespace-aligned table such as
//!
//! ```text
//! Month  H_Gh  H_Bn  T_a
//! Jan    0.9   1.5   2.1
//! ...
//! Year   40.1  60.2  12.0
//! ```
//!
//! Only the `Month` and `H_Gh` columns are used.

use irradiance_core::error::{IrradianceError, Result};
use irradiance_core::models::{month_from_abbreviation, MonthlyAggregateRow};
use tracing::debug;

use crate::decode::{decode, TextEncoding};
use crate::extractor::{ExtractedTable, TableExtractor};
use crate::numeric::coerce_f64;

const COL_MONTH: &str = "Month";
const COL_H_GH: &str = "H_Gh";

/// Parses the monthly source into `(month, H_Gh)` rows.
pub struct MonthlySourceParser;

impl MonthlySourceParser {
    /// Decode raw upload bytes (UTF-8, falling back to Latin-1) and parse them.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Vec<MonthlyAggregateRow>> {
        let text = decode(bytes, TextEncoding::Utf8OrLatin1)?;
        Self::parse_text(&text)
    }

    /// Locate the `Month ...` table inside `text` and parse it.
    pub fn parse_text(text: &str) -> Result<Vec<MonthlyAggregateRow>> {
        let table = TableExtractor::monthly().extract(text)?;
        Self::parse_table(&table)
    }

    /// Project an extracted table onto `Month` and `H_Gh`.
    ///
    /// Rows whose month is not a known abbreviation, or whose `H_Gh` is not
    /// numeric, are dropped. Repeated months are kept as separate rows.
    pub fn parse_table(table: &ExtractedTable) -> Result<Vec<MonthlyAggregateRow>> {
        let header: Vec<&str> = table.header().split_whitespace().collect();
        let month_idx = header.iter().position(|h| *h == COL_MONTH);
        let h_gh_idx = header.iter().position(|h| *h == COL_H_GH);

        let (month_idx, h_gh_idx) = match (month_idx, h_gh_idx) {
            (Some(m), Some(h)) => (m, h),
            _ => {
                let missing = [(COL_MONTH, month_idx), (COL_H_GH, h_gh_idx)]
                    .iter()
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(name, _)| name.to_string())
                    .collect();
                return Err(IrradianceError::MissingColumn(missing));
            }
        };

        let rows: Vec<MonthlyAggregateRow> = table
            .data_lines()
            .iter()
            .filter_map(|line| {
                let fields: Vec<&str> = line.split_whitespace().collect();
                let month = fields.get(month_idx).and_then(|t| month_from_abbreviation(t))?;
                let h_gh = fields.get(h_gh_idx).and_then(|t| coerce_f64(t))?;
                Some(MonthlyAggregateRow { month, h_gh })
            })
            .collect();

        debug!(
            "Monthly table: {} lines read, {} rows kept",
            table.data_lines().len(),
            rows.len()
        );

        Ok(rows)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
