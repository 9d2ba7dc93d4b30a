//! Ratio scaling of hourly-derived totals against the monthly report.
//!
//! For each month the report's `H_Gh` is divided by the hourly source's
//! per-year average; every (year, month) total is then multiplied by that
//! month's ratio. Both steps are inner joins on month, so a month missing
//! from either side simply does not appear in the output.

use irradiance_core::error::{IrradianceError, Result};
use irradiance_core::models::{
    AdjustedRow, MonthlyAggregateRow, MonthlyAverage, MonthlyYearTotal, Pivot, RatioRow,
};
use tracing::debug;

/// Result of one adjustment pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    /// One row per matched (report row, average) pair, ascending by month.
    pub ratios: Vec<RatioRow>,
    /// Year totals scaled by their month's ratio.
    pub adjusted: Vec<AdjustedRow>,
    /// `adjusted` pivoted to month rows × year columns.
    pub adjusted_pivot: Pivot,
}

/// `h_gh / average_ghi`, or `None` when the quotient is undefined or infinite.
pub fn scale_ratio(h_gh: f64, average_ghi: f64) -> Option<f64> {
    if average_ghi == 0.0 {
        return None;
    }
    let ratio = h_gh / average_ghi;
    if ratio.is_infinite() || ratio.is_nan() {
        None
    } else {
        Some(ratio)
    }
}

pub struct RatioAdjuster;

impl RatioAdjuster {
    /// Run the full adjustment.
    ///
    /// # Errors
    /// [`IrradianceError::InsufficientInputs`] when the per-year averages or
    /// the monthly report rows are absent or empty. Joins that match nothing
    /// are not errors; they produce empty tables.
    pub fn adjust(
        averages: Option<&[MonthlyAverage]>,
        year_totals: &[MonthlyYearTotal],
        monthly: Option<&[MonthlyAggregateRow]>,
    ) -> Result<Adjustment> {
        let averages = averages.filter(|a| !a.is_empty()).ok_or_else(|| {
            IrradianceError::InsufficientInputs(
                "hourly monthly averages are not available".to_string(),
            )
        })?;
        let monthly = monthly.filter(|m| !m.is_empty()).ok_or_else(|| {
            IrradianceError::InsufficientInputs(
                "monthly H_Gh values are not available".to_string(),
            )
        })?;

        let ratios = Self::compute_ratios(monthly, averages);
        let adjusted = Self::apply_ratios(year_totals, &ratios);
        let adjusted_pivot = Self::pivot(&adjusted);

        debug!(
            "Adjustment: {} ratio rows, {} adjusted rows",
            ratios.len(),
            adjusted.len()
        );

        Ok(Adjustment {
            ratios,
            adjusted,
            adjusted_pivot,
        })
    }

    /// Inner-join report rows with averages on month and compute each ratio.
    ///
    /// Duplicate report months yield duplicate ratio rows. The result is
    /// stably sorted by month, so ties keep report order.
    pub fn compute_ratios(
        monthly: &[MonthlyAggregateRow],
        averages: &[MonthlyAverage],
    ) -> Vec<RatioRow> {
        let mut ratios: Vec<RatioRow> = monthly
            .iter()
            .flat_map(|row| {
                averages
                    .iter()
                    .filter(move |avg| avg.month == row.month)
                    .map(move |avg| RatioRow {
                        month: row.month,
                        h_gh: row.h_gh,
                        average_ghi: avg.average_ghi,
                        ratio: scale_ratio(row.h_gh, avg.average_ghi),
                    })
            })
            .collect();
        ratios.sort_by_key(|r| r.month);
        ratios
    }

    /// Inner-join year totals with ratio rows on month.
    ///
    /// A product that is not finite (an infinite total scaled by a zero
    /// ratio, for instance) is recorded as missing.
    pub fn apply_ratios(year_totals: &[MonthlyYearTotal], ratios: &[RatioRow]) -> Vec<AdjustedRow> {
        year_totals
            .iter()
            .flat_map(|total| {
                ratios
                    .iter()
                    .filter(move |r| r.month == total.month)
                    .map(move |r| AdjustedRow {
                        year: total.year,
                        month: total.month,
                        total_ghi: total.total_ghi,
                        ratio: r.ratio,
                        adjusted_ghi: r
                            .ratio
                            .map(|ratio| total.total_ghi * ratio)
                            .filter(|v| v.is_finite()),
                    })
            })
            .collect()
    }

    /// Pivot adjusted values into month rows × year columns.
    pub fn pivot(adjusted: &[AdjustedRow]) -> Pivot {
        Pivot::from_cells(adjusted.iter().map(|r| (r.month, r.year, r.adjusted_ghi)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
