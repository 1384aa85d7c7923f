//! Monthly totals with a running cumulative sum.

use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::LayoffRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// Calendar month as `YYYY-MM`
    pub month: String,
    /// Sum of `total_laid_off` for events in the month (null totals count as 0)
    pub total_laid_off: i64,
    /// Sum of every month up to and including this one
    pub rolling_total: i64,
}

/// Prefix sums of `totals`.
pub fn running_sum(totals: &[i64]) -> Vec<i64> {
    totals
        .iter()
        .scan(0_i64, |acc, &t| {
            *acc += t;
            Some(*acc)
        })
        .collect()
}

/// Bucket dated events by month and accumulate chronologically.
///
/// Undated events belong to no month and are left out.
pub fn rolling_monthly_totals(records: &[LayoffRecord]) -> Vec<MonthlyTotal> {
    let mut buckets: BTreeMap<(i32, u32), i64> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date() {
            *buckets.entry((date.year(), date.month())).or_insert(0) += record.total_laid_off.unwrap_or(0);
        }
    }

    let totals: Vec<i64> = buckets.values().copied().collect();
    buckets
        .keys()
        .zip(totals.iter().zip(running_sum(&totals)))
        .map(|(&(year, month), (&total, rolling))| MonthlyTotal {
            month: format!("{:04}-{:02}", year, month),
            total_laid_off: total,
            rolling_total: rolling,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::dated;

    #[test]
    fn test_running_sum() {
        assert_eq!(running_sum(&[10, 20, 30]), vec![10, 30, 60]);
        assert!(running_sum(&[]).is_empty());
    }

    #[test]
    fn test_months_in_chronological_order() {
        let records = vec![
            dated("A", 2021, 1, 15, Some(20)),
            dated("B", 2020, 12, 1, Some(10)),
            dated("C", 2021, 1, 2, Some(5)),
            dated("D", 2021, 3, 9, Some(30)),
        ];

        let months = rolling_monthly_totals(&records);
        let flat: Vec<(&str, i64, i64)> = months
            .iter()
            .map(|m| (m.month.as_str(), m.total_laid_off, m.rolling_total))
            .collect();
        assert_eq!(flat, vec![("2020-12", 10, 10), ("2021-01", 25, 35), ("2021-03", 30, 65)]);
    }

    #[test]
    fn test_undated_and_null_totals() {
        let mut undated = dated("A", 2021, 1, 1, Some(100));
        undated.event_date = None;
        let records = vec![undated, dated("B", 2021, 2, 1, None), dated("C", 2021, 2, 3, Some(7))];

        let months = rolling_monthly_totals(&records);
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].total_laid_off, 7);
    }

    #[test]
    fn test_year_boundary_keeps_month_zero_padded() {
        let months = rolling_monthly_totals(&[dated("A", 2022, 9, 1, Some(1))]);
        assert_eq!(months[0].month, "2022-09");
    }
}
