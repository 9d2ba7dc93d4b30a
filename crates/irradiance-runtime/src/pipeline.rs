//! Per-session pipeline state.
//!
//! A [`PipelineContext`] holds everything derived from one hourly upload and
//! one monthly upload. Each source is loaded independently: a new upload (or
//! a withdrawn one) discards only that source's derived state, recomputes it
//! from scratch, and then recomputes the adjustment from whatever both sides
//! currently hold. Nothing is shared between contexts.
//!
//! # Example
//! ```no_run
//! use irradiance_core::settings::SchemaConfig;
//! use irradiance_runtime::pipeline::PipelineContext;
//!
//! let mut ctx = PipelineContext::new(SchemaConfig::default()).unwrap();
//! let hourly = std::fs::read("power_hourly.csv").unwrap();
//! let monthly = std::fs::read("report.txt").unwrap();
//! ctx.load_hourly(Some(&hourly)).ok();
//! ctx.load_monthly(Some(&monthly)).ok();
//! if let Some(adj) = ctx.adjustment() {
//!     println!("{} adjusted rows", adj.adjusted.len());
//! }
//! ```

use irradiance_core::error::{IrradianceError, Result};
use irradiance_core::models::{HourlyDataset, MonthlyAggregateRow};
use irradiance_core::settings::SchemaConfig;
use irradiance_core::table::Table;
use irradiance_data::adjuster::{Adjustment, RatioAdjuster};
use irradiance_data::aggregator::{HourlyAggregates, IrradianceAggregator};
use irradiance_data::hourly::HourlySourceParser;
use irradiance_data::monthly::MonthlySourceParser;

// ── HourlyState ───────────────────────────────────────────────────────────────

/// Everything derived from a successfully parsed hourly upload.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyState {
    pub dataset: HourlyDataset,
    pub aggregates: HourlyAggregates,
}

// ── NamedTable ────────────────────────────────────────────────────────────────

/// A derived table with the names used for display and export.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTable {
    /// File stem used when exporting, e.g. `monthly_ghi_per_year`.
    pub name: &'static str,
    /// Heading shown above the table.
    pub title: &'static str,
    pub table: Table,
}

// ── PipelineContext ───────────────────────────────────────────────────────────

/// Explicit replacement for process-wide session state.
#[derive(Debug)]
pub struct PipelineContext {
    schema: SchemaConfig,
    hourly: Option<HourlyState>,
    monthly: Option<Vec<MonthlyAggregateRow>>,
    /// Outcome of the most recent adjustment attempt.
    adjustment: Result<Adjustment>,
}

impl PipelineContext {
    /// Create an empty context.
    ///
    /// # Errors
    /// [`IrradianceError::Config`] when `schema` fails validation.
    pub fn new(schema: SchemaConfig) -> Result<Self> {
        schema.validate()?;
        Ok(Self {
            schema,
            hourly: None,
            monthly: None,
            adjustment: Err(Self::not_loaded()),
        })
    }

    // ── Uploads ───────────────────────────────────────────────────────────

    /// Replace the hourly source with `upload`, or withdraw it with `None`.
    ///
    /// On a parse failure the hourly state is reset to absent and the error
    /// is returned; the monthly state is untouched either way.
    pub fn load_hourly(&mut self, upload: Option<&[u8]>) -> Result<()> {
        self.hourly = None;

        let outcome = match upload {
            None => {
                tracing::info!("hourly source withdrawn");
                Ok(())
            }
            Some(bytes) => {
                let parser = HourlySourceParser::new(self.schema.clone());
                parser.parse_bytes(bytes).map(|dataset| {
                    let aggregates = IrradianceAggregator::aggregate(&dataset);
                    tracing::info!(
                        rows = dataset.records.len(),
                        years = aggregates.distinct_years,
                        total_ghi = dataset.total_ghi(),
                        column = %dataset.irradiance_column,
                        "hourly source loaded"
                    );
                    self.hourly = Some(HourlyState {
                        dataset,
                        aggregates,
                    });
                })
            }
        };

        if let Err(e) = &outcome {
            tracing::warn!(error = %e, "hourly source rejected");
        }
        self.refresh_adjustment();
        outcome
    }

    /// Replace the monthly source with `upload`, or withdraw it with `None`.
    ///
    /// On a parse failure the monthly state is reset to absent and the error
    /// is returned; the hourly state is untouched either way.
    pub fn load_monthly(&mut self, upload: Option<&[u8]>) -> Result<()> {
        self.monthly = None;

        let outcome = match upload {
            None => {
                tracing::info!("monthly source withdrawn");
                Ok(())
            }
            Some(bytes) => MonthlySourceParser::parse_bytes(bytes).map(|rows| {
                tracing::info!(rows = rows.len(), "monthly source loaded");
                self.monthly = Some(rows);
            }),
        };

        if let Err(e) = &outcome {
            tracing::warn!(error = %e, "monthly source rejected");
        }
        self.refresh_adjustment();
        outcome
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    pub fn hourly(&self) -> Option<&HourlyState> {
        self.hourly.as_ref()
    }

    pub fn monthly_rows(&self) -> Option<&[MonthlyAggregateRow]> {
        self.monthly.as_deref()
    }

    /// Distinct year count of the hourly source, when one is loaded.
    pub fn distinct_years(&self) -> Option<usize> {
        self.hourly.as_ref().map(|h| h.aggregates.distinct_years)
    }

    /// The current adjustment, or `None` when it could not be computed.
    pub fn adjustment(&self) -> Option<&Adjustment> {
        self.adjustment.as_ref().ok()
    }

    /// Why the adjustment is absent, typically
    /// [`IrradianceError::InsufficientInputs`].
    pub fn adjustment_error(&self) -> Option<&IrradianceError> {
        self.adjustment.as_ref().err()
    }

    /// Every table computed in the current state, in presentation order.
    ///
    /// Tables that were not computed are left out; computed tables with no
    /// rows are included.
    pub fn tables(&self) -> Vec<NamedTable> {
        let mut tables = Vec::new();

        if let Some(h) = &self.hourly {
            let agg = &h.aggregates;
            tables.push(NamedTable {
                name: "hourly_ghi",
                title: "Hourly data with GHI column",
                table: Table::from(&h.dataset),
            });
            tables.push(NamedTable {
                name: "monthly_sum_all_years_ghi",
                title: "1. Monthly GHI Aggregations (Across All Years)",
                table: Table::from(agg.monthly_totals.as_slice()),
            });
            if let Some(averages) = &agg.monthly_averages {
                tables.push(NamedTable {
                    name: "monthly_avg_per_year_ghi",
                    title: "2. Average GHI for Each Month (Per Year)",
                    table: Table::from(averages.as_slice()),
                });
            }
            tables.push(NamedTable {
                name: "monthly_ghi_per_year",
                title: "3. Total GHI for Each Month within Each Year",
                table: Table::from(agg.year_totals.as_slice()),
            });
            tables.push(NamedTable {
                name: "pivot_table_ghi",
                title: "4. Total GHI (kW/m^2) by Month and Year",
                table: Table::from(&agg.year_pivot),
            });
        }

        if let Some(rows) = &self.monthly {
            tables.push(NamedTable {
                name: "monthly_hgh",
                title: "Monthly H_Gh",
                table: Table::from(rows.as_slice()),
            });
        }

        if let Ok(adj) = &self.adjustment {
            tables.push(NamedTable {
                name: "hgh_avg_ghi_ratio",
                title: "H_Gh / Average GHI Ratio",
                table: Table::from(adj.ratios.as_slice()),
            });
            tables.push(NamedTable {
                name: "monthly_ghi_adjusted",
                title: "Adjusted Monthly GHI (Total GHI x Ratio)",
                table: Table::from(adj.adjusted.as_slice()),
            });
            tables.push(NamedTable {
                name: "adjusted_ghi_pivot_table",
                title: "Adjusted GHI (kW/m^2) by Month and Year",
                table: Table::from(&adj.adjusted_pivot),
            });
        }

        tables
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn refresh_adjustment(&mut self) {
        let (averages, year_totals) = match &self.hourly {
            Some(h) => (
                h.aggregates.monthly_averages.as_deref(),
                h.aggregates.year_totals.as_slice(),
            ),
            None => (None, &[][..]),
        };

        self.adjustment = RatioAdjuster::adjust(averages, year_totals, self.monthly.as_deref());

        match &self.adjustment {
            Ok(adj) => tracing::info!(
                ratios = adj.ratios.len(),
                adjusted = adj.adjusted.len(),
                "adjustment computed"
            ),
            Err(e) => tracing::debug!(reason = %e, "adjustment not computed"),
        }
    }

    fn not_loaded() -> IrradianceError {
        IrradianceError::InsufficientInputs("no sources loaded".to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
