//! Aggregation and ranking over the cleaned record set.
//!
//! Every function here reads `&[LayoffRecord]` and returns a new table;
//! nothing mutates the records, so results can be computed in any order.
//!
//! - `magnitude`: sum and mean of layoffs per category
//! - `shutdown`: share of companies that shut down, per category
//! - `rolling`: monthly totals with a cumulative sum
//! - `ranking`: dense-ranked top companies per year
//! - `explore`: overview, totals per category, full shutdowns

pub mod explore;
pub mod magnitude;
pub mod ranking;
pub mod rolling;
pub mod shutdown;

use serde::Serialize;

pub use explore::{full_shutdowns, overview, totals_by, CategoryTotal, Overview};
pub use magnitude::{magnitude_summary, MagnitudeRow};
pub use ranking::{dense_rank_desc, top_companies_by_year, CompanyYearRank, DEFAULT_TOP_N};
pub use rolling::{rolling_monthly_totals, running_sum, MonthlyTotal};
pub use shutdown::{shutdown_rate, shutdown_rates, ShutdownRateRow};

use crate::models::{Dimension, LayoffRecord};

/// Which dimensions and how many ranks [`analyze`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisOptions {
    pub magnitude_by: Dimension,
    pub shutdown_by: Dimension,
    pub totals_by: Dimension,
    pub top_n: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            magnitude_by: Dimension::Stage,
            shutdown_by: Dimension::Industry,
            totals_by: Dimension::Company,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Every analytical table for one cleaned record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub overview: Overview,
    pub magnitude_by: Dimension,
    pub magnitude: Vec<MagnitudeRow>,
    pub shutdown_by: Dimension,
    pub shutdown_rates: Vec<ShutdownRateRow>,
    pub monthly: Vec<MonthlyTotal>,
    pub top_n: usize,
    pub top_companies: Vec<CompanyYearRank>,
    pub totals_by: Dimension,
    pub totals: Vec<CategoryTotal>,
    pub full_shutdowns: Vec<LayoffRecord>,
}

pub fn analyze(records: &[LayoffRecord], options: &AnalysisOptions) -> AnalysisReport {
    AnalysisReport {
        overview: overview(records),
        magnitude_by: options.magnitude_by,
        magnitude: magnitude_summary(records, options.magnitude_by),
        shutdown_by: options.shutdown_by,
        shutdown_rates: shutdown_rates(records, options.shutdown_by),
        monthly: rolling_monthly_totals(records),
        top_n: options.top_n,
        top_companies: top_companies_by_year(records, options.top_n),
        totals_by: options.totals_by,
        totals: totals_by(records, options.totals_by),
        full_shutdowns: full_shutdowns(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::dated;

    #[test]
    fn test_analyze_does_not_mutate_input() {
        let records = vec![
            dated("A", 2022, 1, 1, Some(10)),
            dated("B", 2022, 2, 1, Some(20)),
            dated("C", 2022, 3, 1, Some(30)),
        ];
        let before = records.clone();

        let report = analyze(&records, &AnalysisOptions::default());

        assert_eq!(records, before);
        let rolling: Vec<i64> = report.monthly.iter().map(|m| m.rolling_total).collect();
        assert_eq!(rolling, vec![10, 30, 60]);
        assert_eq!(report.top_companies.len(), 3);
        assert_eq!(report.overview.records, 3);
    }
}
