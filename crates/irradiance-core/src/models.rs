use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Three-letter month abbreviations used by the monthly report, in calendar order.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Map a month abbreviation (`"Jan"` … `"Dec"`) to its number (1–12).
///
/// Matching is exact: `"jan"` and `"January"` are not recognised.
pub fn month_from_abbreviation(token: &str) -> Option<u32> {
    MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| *abbr == token)
        .map(|idx| idx as u32 + 1)
}

// ── Hourly source ─────────────────────────────────────────────────────────────

/// One cleaned row of the hourly export.
///
/// Only rows with a year, a month and a numeric irradiance value survive
/// cleaning, so none of those fields are optional here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub year: i32,
    pub month: u32,
    /// Day of month (`DY`), when the column is present and numeric.
    #[serde(default)]
    pub day: Option<u32>,
    /// Hour of day (`HR`), when the column is present and numeric.
    #[serde(default)]
    pub hour: Option<u32>,
    /// Raw irradiance flux as read from the `ALLSKY_SFC_*` column.
    pub raw_flux: f64,
    /// Scaled irradiance (`raw_flux / divisor`).
    pub ghi: f64,
}

/// The cleaned hourly dataset together with what was learned while parsing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyDataset {
    /// Name of the irradiance column that was located, e.g. `ALLSKY_SFC_SW_DWN`.
    pub irradiance_column: String,
    pub records: Vec<HourlyRecord>,
}

impl HourlyDataset {
    /// Number of distinct years present in the cleaned rows.
    pub fn distinct_years(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Sum of `ghi` over every cleaned row.
    pub fn total_ghi(&self) -> f64 {
        self.records.iter().map(|r| r.ghi).sum()
    }
}

// ── Monthly source ────────────────────────────────────────────────────────────

/// One row of the monthly report after projection to `Month` and `H_Gh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregateRow {
    pub month: u32,
    pub h_gh: f64,
}

// ── Aggregation views ─────────────────────────────────────────────────────────

/// Total GHI for one calendar month summed across all years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: u32,
    pub total_ghi: f64,
}

/// Total GHI for one calendar month divided by the number of distinct years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverage {
    pub month: u32,
    pub average_ghi: f64,
}

/// Total GHI for one (year, month) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyYearTotal {
    pub year: i32,
    pub month: u32,
    pub total_ghi: f64,
}

// ── Adjustment ────────────────────────────────────────────────────────────────

/// Correction factor for one month: the monthly report's `H_Gh` over the
/// hourly source's per-year average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    pub month: u32,
    pub h_gh: f64,
    pub average_ghi: f64,
    /// `None` when the average is zero or the quotient is not finite.
    pub ratio: Option<f64>,
}

/// A (year, month) total scaled by that month's ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedRow {
    pub year: i32,
    pub month: u32,
    pub total_ghi: f64,
    pub ratio: Option<f64>,
    /// `total_ghi * ratio`, missing whenever the ratio is missing or the
    /// product is not finite.
    pub adjusted_ghi: Option<f64>,
}

// ── Pivot ─────────────────────────────────────────────────────────────────────

/// Month × year table with one summed value per cell.
///
/// Rows and columns list only the months and years that were observed.
/// Combinations never observed (or observed only with missing values) have no
/// cell at all; they are never filled with zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pivot {
    /// Observed months, ascending.
    pub months: Vec<u32>,
    /// Observed years, ascending.
    pub years: Vec<i32>,
    cells: BTreeMap<(u32, i32), f64>,
}

impl Pivot {
    /// Build a pivot from `(month, year, value)` triples, summing duplicates.
    pub fn from_cells(cells: impl IntoIterator<Item = (u32, i32, Option<f64>)>) -> Self {
        let mut months = BTreeSet::new();
        let mut years = BTreeSet::new();
        let mut sums: BTreeMap<(u32, i32), f64> = BTreeMap::new();

        for (month, year, value) in cells {
            months.insert(month);
            years.insert(year);
            if let Some(v) = value {
                *sums.entry((month, year)).or_insert(0.0) += v;
            }
        }

        Self {
            months: months.into_iter().collect(),
            years: years.into_iter().collect(),
            cells: sums,
        }
    }

    /// Value at `(month, year)`, or `None` when the combination is absent.
    pub fn get(&self, month: u32, year: i32) -> Option<f64> {
        self.cells.get(&(month, year)).copied()
    }

    /// One row of cells for `month`, aligned with [`Pivot::years`].
    pub fn row(&self, month: u32) -> Vec<Option<f64>> {
        self.years.iter().map(|&y| self.get(month, y)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
