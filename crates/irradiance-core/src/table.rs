//! Generic column-named tables.
//!
//! Every derived view converts into a [`Table`] so the export and rendering
//! layers only need to understand one shape. Column titles match the ones
//! users see in downloaded CSV files.

use crate::models::{
    AdjustedRow, HourlyDataset, MonthlyAggregateRow, MonthlyAverage, MonthlyTotal,
    MonthlyYearTotal, Pivot, RatioRow,
};

pub const COL_MONTH_SHORT: &str = "MO";
pub const COL_MONTH: &str = "Month";
pub const COL_YEAR: &str = "Year";
pub const COL_H_GH: &str = "H_Gh";
pub const COL_TOTAL_ALL_YEARS: &str = "Total GHI Across All Years (kW/m^2)";
pub const COL_AVERAGE: &str = "Average GHI Per Month (kW/m^2/year)";
pub const COL_TOTAL: &str = "Total GHI (kW/m^2)";
pub const COL_RATIO: &str = "H_Gh / Avg GHI Ratio";
pub const COL_ADJUSTED: &str = "Adjusted GHI (kW/m^2)";

// ── Cell ──────────────────────────────────────────────────────────────────────

/// A single table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Text written to a delimited file for this cell.
    ///
    /// Missing values become an empty field. Integral floats keep a trailing
    /// `.0` so float columns stay recognisable as such.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                format!("{:.1}", v)
            }
            Cell::Float(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Missing => String::new(),
        }
    }
}

/// `None` and `NaN` both become [`Cell::Missing`].
impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value
            .filter(|v| !v.is_nan())
            .map_or(Cell::Missing, Cell::Float)
    }
}

impl From<Option<u32>> for Cell {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Cell::Missing, |v| Cell::Int(i64::from(v)))
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// One table row: its index label and one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub index: String,
    pub cells: Vec<Cell>,
}

/// A rectangular table with named columns and a labelled index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Header for the index column; empty for positional or unnamed indices.
    pub index_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            index_name: String::new(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row whose index is its position (0, 1, 2, …).
    pub fn push_positional(&mut self, cells: Vec<Cell>) {
        let index = self.rows.len().to_string();
        self.push(index, cells);
    }

    pub fn push(&mut self, index: impl Into<String>, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.columns.len());
        self.rows.push(TableRow {
            index: index.into(),
            cells,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ── Conversions ───────────────────────────────────────────────────────────────

impl From<&HourlyDataset> for Table {
    fn from(dataset: &HourlyDataset) -> Self {
        let mut table = Table::new(vec![
            "YEAR".to_string(),
            "MO".to_string(),
            "DY".to_string(),
            "HR".to_string(),
            dataset.irradiance_column.clone(),
            "GHI".to_string(),
        ]);
        for r in &dataset.records {
            table.push_positional(vec![
                Cell::Int(i64::from(r.year)),
                Cell::Int(i64::from(r.month)),
                Cell::from(r.day),
                Cell::from(r.hour),
                Cell::Float(r.raw_flux),
                Cell::Float(r.ghi),
            ]);
        }
        table
    }
}

impl From<&[MonthlyAggregateRow]> for Table {
    fn from(rows: &[MonthlyAggregateRow]) -> Self {
        let mut table = Table::new(columns(&[COL_MONTH, COL_H_GH]));
        for r in rows {
            table.push_positional(vec![Cell::Int(i64::from(r.month)), Cell::Float(r.h_gh)]);
        }
        table
    }
}

impl From<&[MonthlyTotal]> for Table {
    fn from(rows: &[MonthlyTotal]) -> Self {
        let mut table = Table::new(columns(&[COL_MONTH_SHORT, COL_TOTAL_ALL_YEARS]));
        for r in rows {
            table.push_positional(vec![
                Cell::Int(i64::from(r.month)),
                Cell::Float(r.total_ghi),
            ]);
        }
        table
    }
}

impl From<&[MonthlyAverage]> for Table {
    fn from(rows: &[MonthlyAverage]) -> Self {
        let mut table = Table::new(columns(&[COL_MONTH, COL_AVERAGE]));
        for r in rows {
            table.push_positional(vec![
                Cell::Int(i64::from(r.month)),
                Cell::Float(r.average_ghi),
            ]);
        }
        table
    }
}

impl From<&[MonthlyYearTotal]> for Table {
    fn from(rows: &[MonthlyYearTotal]) -> Self {
        let mut table = Table::new(columns(&[COL_YEAR, COL_MONTH, COL_TOTAL]));
        for r in rows {
            table.push_positional(vec![
                Cell::Int(i64::from(r.year)),
                Cell::Int(i64::from(r.month)),
                Cell::Float(r.total_ghi),
            ]);
        }
        table
    }
}

impl From<&[RatioRow]> for Table {
    fn from(rows: &[RatioRow]) -> Self {
        let mut table = Table::new(columns(&[COL_MONTH, COL_H_GH, COL_AVERAGE, COL_RATIO]));
        for r in rows {
            table.push_positional(vec![
                Cell::Int(i64::from(r.month)),
                Cell::Float(r.h_gh),
                Cell::Float(r.average_ghi),
                Cell::from(r.ratio),
            ]);
        }
        table
    }
}

impl From<&[AdjustedRow]> for Table {
    fn from(rows: &[AdjustedRow]) -> Self {
        let mut table = Table::new(columns(&[
            COL_YEAR,
            COL_MONTH,
            COL_TOTAL,
            COL_RATIO,
            COL_ADJUSTED,
        ]));
        for r in rows {
            table.push_positional(vec![
                Cell::Int(i64::from(r.year)),
                Cell::Int(i64::from(r.month)),
                Cell::Float(r.total_ghi),
                Cell::from(r.ratio),
                Cell::from(r.adjusted_ghi),
            ]);
        }
        table
    }
}

/// Pivots have an unnamed month index and one column per year.
impl From<&Pivot> for Table {
    fn from(pivot: &Pivot) -> Self {
        let mut table = Table::new(pivot.years.iter().map(|y| y.to_string()).collect());
        for &month in &pivot.months {
            let cells = pivot.row(month).into_iter().map(Cell::from).collect();
            table.push(month.to_string(), cells);
        }
        table
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
