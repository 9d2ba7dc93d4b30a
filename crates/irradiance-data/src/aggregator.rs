//! Monthly aggregation views over the cleaned hourly dataset.

use std::collections::BTreeMap;

use irradiance_core::models::{
    HourlyDataset, HourlyRecord, MonthlyAverage, MonthlyTotal, MonthlyYearTotal, Pivot,
};
use tracing::debug;

// ── HourlyAggregates ──────────────────────────────────────────────────────────

/// All four views derived from one hourly dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyAggregates {
    /// Number of distinct years in the cleaned rows.
    pub distinct_years: usize,
    /// Month → total GHI across all years, ascending by month.
    pub monthly_totals: Vec<MonthlyTotal>,
    /// Month → total / distinct years. `None` when there are no years.
    pub monthly_averages: Option<Vec<MonthlyAverage>>,
    /// (year, month) → total GHI, ascending by year then month.
    pub year_totals: Vec<MonthlyYearTotal>,
    /// `year_totals` pivoted to month rows × year columns.
    pub year_pivot: Pivot,
}

// ── IrradianceAggregator ──────────────────────────────────────────────────────

/// Stateless helper that groups hourly GHI by month and year.
pub struct IrradianceAggregator;

impl IrradianceAggregator {
    /// Compute every view for `dataset`.
    pub fn aggregate(dataset: &HourlyDataset) -> HourlyAggregates {
        let distinct_years = dataset.distinct_years();
        let monthly_totals = Self::monthly_total_all_years(&dataset.records);
        let monthly_averages = Self::monthly_average_per_year(&monthly_totals, distinct_years);
        let year_totals = Self::monthly_year_totals(&dataset.records);
        let year_pivot = Self::pivot(&year_totals);

        debug!(
            "Aggregated {} hourly rows: {} years, {} months, {} year-month totals",
            dataset.records.len(),
            distinct_years,
            monthly_totals.len(),
            year_totals.len()
        );

        HourlyAggregates {
            distinct_years,
            monthly_totals,
            monthly_averages,
            year_totals,
            year_pivot,
        }
    }

    /// Sum GHI per calendar month across all years.
    pub fn monthly_total_all_years(records: &[HourlyRecord]) -> Vec<MonthlyTotal> {
        let mut map: BTreeMap<u32, f64> = BTreeMap::new();
        for r in records {
            *map.entry(r.month).or_insert(0.0) += r.ghi;
        }
        map.into_iter()
            .map(|(month, total_ghi)| MonthlyTotal { month, total_ghi })
            .collect()
    }

    /// Divide each monthly total by the number of distinct years.
    ///
    /// Returns `None` when `distinct_years` is zero: the view is withheld
    /// rather than filled with infinities.
    pub fn monthly_average_per_year(
        totals: &[MonthlyTotal],
        distinct_years: usize,
    ) -> Option<Vec<MonthlyAverage>> {
        if distinct_years == 0 {
            return None;
        }
        let years = distinct_years as f64;
        Some(
            totals
                .iter()
                .map(|t| MonthlyAverage {
                    month: t.month,
                    average_ghi: t.total_ghi / years,
                })
                .collect(),
        )
    }

    /// Sum GHI per (year, month) pair.
    pub fn monthly_year_totals(records: &[HourlyRecord]) -> Vec<MonthlyYearTotal> {
        let mut map: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for r in records {
            *map.entry((r.year, r.month)).or_insert(0.0) += r.ghi;
        }
        map.into_iter()
            .map(|((year, month), total_ghi)| MonthlyYearTotal {
                year,
                month,
                total_ghi,
            })
            .collect()
    }

    /// Pivot (year, month) totals into month rows × year columns.
    pub fn pivot(year_totals: &[MonthlyYearTotal]) -> Pivot {
        Pivot::from_cells(
            year_totals
                .iter()
                .map(|t| (t.month, t.year, Some(t.total_ghi))),
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn record(year: i32, month: u32, raw_flux: f64) -> HourlyRecord {
        HourlyRecord {
            year,
            month,
            day: Some(1),
            hour: Some(0),
            raw_flux,
            ghi: raw_flux / 1000.0,
        }
    }

    fn dataset(records: Vec<HourlyRecord>) -> HourlyDataset {
        HourlyDataset {
            irradiance_column: "ALLSKY_SFC_SW_DWN".to_string(),
            records,
        }
    }

    /// Three January rows over two years.
    fn two_year_january() -> HourlyDataset {
        dataset(vec![
            record(2020, 1, 500.0),
            record(2020, 1, 300.0),
            record(2021, 1, 400.0),
        ])
    }

    fn mixed() -> HourlyDataset {
        dataset(vec![
            record(2021, 3, 120.0),
            record(2019, 1, 80.0),
            record(2020, 12, 40.0),
            record(2019, 3, 10.0),
            record(2021, 1, 250.0),
            record(2019, 1, 35.5),
        ])
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_two_year_january_views() {
        let agg = IrradianceAggregator::aggregate(&two_year_january());

        assert_eq!(agg.distinct_years, 2);
        assert_eq!(agg.monthly_totals.len(), 1);
        assert_eq!(agg.monthly_totals[0].month, 1);
        assert!((agg.monthly_totals[0].total_ghi - 1.2).abs() < EPS);

        let averages = agg.monthly_averages.unwrap();
        assert!((averages[0].average_ghi - 0.6).abs() < EPS);

        assert_eq!(agg.year_totals.len(), 2);
        assert_eq!((agg.year_totals[0].year, agg.year_totals[0].month), (2020, 1));
        assert!((agg.year_totals[0].total_ghi - 0.8).abs() < EPS);
        assert_eq!((agg.year_totals[1].year, agg.year_totals[1].month), (2021, 1));
        assert!((agg.year_totals[1].total_ghi - 0.4).abs() < EPS);
    }

    // ── Properties ────────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_totals_conserve_sum() {
        let data = mixed();
        let totals = IrradianceAggregator::monthly_total_all_years(&data.records);
        let sum: f64 = totals.iter().map(|t| t.total_ghi).sum();
        assert!((sum - data.total_ghi()).abs() < EPS);
    }

    #[test]
    fn test_average_times_years_equals_total() {
        let agg = IrradianceAggregator::aggregate(&mixed());
        let averages = agg.monthly_averages.as_ref().unwrap();
        for (avg, total) in averages.iter().zip(&agg.monthly_totals) {
            assert_eq!(avg.month, total.month);
            assert!((avg.average_ghi * agg.distinct_years as f64 - total.total_ghi).abs() < EPS);
        }
    }

    #[test]
    fn test_pivot_matches_year_totals() {
        let agg = IrradianceAggregator::aggregate(&mixed());
        for t in &agg.year_totals {
            assert_eq!(agg.year_pivot.get(t.month, t.year), Some(t.total_ghi));
        }
        // 2020 only has December.
        assert_eq!(agg.year_pivot.get(1, 2020), None);
        assert_eq!(agg.year_pivot.months, vec![1, 3, 12]);
        assert_eq!(agg.year_pivot.years, vec![2019, 2020, 2021]);
    }

    // ── Ordering ──────────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_totals_sorted_by_month() {
        let totals = IrradianceAggregator::monthly_total_all_years(&mixed().records);
        let months: Vec<u32> = totals.iter().map(|t| t.month).collect();
        assert_eq!(months, vec![1, 3, 12]);
    }

    #[test]
    fn test_year_totals_sorted_year_then_month() {
        let totals = IrradianceAggregator::monthly_year_totals(&mixed().records);
        let keys: Vec<(i32, u32)> = totals.iter().map(|t| (t.year, t.month)).collect();
        assert_eq!(keys, vec![(2019, 1), (2019, 3), (2020, 12), (2021, 1), (2021, 3)]);
    }

    // ── Edge cases ────────────────────────────────────────────────────────────

    #[test]
    fn test_average_withheld_without_years() {
        assert!(IrradianceAggregator::monthly_average_per_year(&[], 0).is_none());
    }

    #[test]
    fn test_empty_records() {
        let agg = IrradianceAggregator::aggregate(&dataset(vec![]));
        assert_eq!(agg.distinct_years, 0);
        assert!(agg.monthly_totals.is_empty());
        assert!(agg.monthly_averages.is_none());
        assert!(agg.year_totals.is_empty());
        assert!(agg.year_pivot.is_empty());
    }
}
