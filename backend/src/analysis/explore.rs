//! Exploratory queries over the cleaned set: dataset overview, totals per
//! category and the list of full shutdowns.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::{Dimension, LayoffRecord};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    pub records: usize,
    pub companies: usize,
    pub earliest_date: Option<NaiveDate>,
    pub latest_date: Option<NaiveDate>,
    pub max_total_laid_off: Option<i64>,
    pub max_percentage_laid_off: Option<f64>,
    pub total_laid_off: i64,
}

pub fn overview(records: &[LayoffRecord]) -> Overview {
    let companies: HashSet<&str> = records.iter().map(|r| r.company.as_str()).collect();
    let dates = records.iter().filter_map(LayoffRecord::date);

    Overview {
        records: records.len(),
        companies: companies.len(),
        earliest_date: dates.clone().min(),
        latest_date: dates.max(),
        max_total_laid_off: records.iter().filter_map(|r| r.total_laid_off).max(),
        max_percentage_laid_off: records
            .iter()
            .filter_map(|r| r.percentage_laid_off)
            .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p)))),
        total_laid_off: records.iter().filter_map(|r| r.total_laid_off).sum(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Option<String>,
    pub total_laid_off: i64,
}

/// Sum of `total_laid_off` per category, largest first.
pub fn totals_by(records: &[LayoffRecord], by: Dimension) -> Vec<CategoryTotal> {
    let mut sums: HashMap<Option<String>, i64> = HashMap::new();
    for record in records {
        *sums.entry(by.key(record)).or_insert(0) += record.total_laid_off.unwrap_or(0);
    }

    let mut rows: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, total_laid_off)| CategoryTotal { category, total_laid_off })
        .collect();
    rows.sort_by(|a, b| b.total_laid_off.cmp(&a.total_laid_off).then_with(|| a.category.cmp(&b.category)));
    rows
}

/// Events where the whole workforce was laid off, best-funded first.
pub fn full_shutdowns(records: &[LayoffRecord]) -> Vec<LayoffRecord> {
    let mut rows: Vec<LayoffRecord> = records.iter().filter(|r| r.is_full_shutdown()).cloned().collect();
    rows.sort_by(|a, b| match (a.funds_raised_millions, b.funds_raised_millions) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{dated, record};

    #[test]
    fn test_overview() {
        let mut shut = dated("Katerra", 2020, 6, 1, Some(2434));
        shut.percentage_laid_off = Some(1.0);
        let records = vec![
            dated("Amazon", 2022, 11, 16, Some(10000)),
            dated("Amazon", 2023, 1, 4, Some(8000)),
            shut,
        ];

        let o = overview(&records);
        assert_eq!(o.records, 3);
        assert_eq!(o.companies, 2);
        assert_eq!(o.earliest_date, NaiveDate::from_ymd_opt(2020, 6, 1));
        assert_eq!(o.latest_date, NaiveDate::from_ymd_opt(2023, 1, 4));
        assert_eq!(o.max_total_laid_off, Some(10000));
        assert_eq!(o.max_percentage_laid_off, Some(1.0));
        assert_eq!(o.total_laid_off, 20434);
    }

    #[test]
    fn test_overview_empty() {
        assert_eq!(overview(&[]), Overview::default());
    }

    #[test]
    fn test_totals_by_company() {
        let records = vec![
            dated("Meta", 2022, 11, 9, Some(11000)),
            dated("Google", 2023, 1, 20, Some(12000)),
            dated("Meta", 2023, 3, 14, Some(10000)),
        ];
        let rows = totals_by(&records, Dimension::Company);
        assert_eq!(rows[0], CategoryTotal { category: Some("Meta".into()), total_laid_off: 21000 });
        assert_eq!(rows[1].category.as_deref(), Some("Google"));
    }

    #[test]
    fn test_full_shutdowns_by_funding() {
        let shutdown = |company: &str, funds: Option<i64>| LayoffRecord {
            percentage_laid_off: Some(1.0),
            funds_raised_millions: funds,
            ..record(company)
        };
        let records = vec![
            shutdown("Small", Some(5)),
            record("Partial"),
            shutdown("Unknown", None),
            shutdown("Britishvolt", Some(2400)),
        ];

        let names: Vec<String> = full_shutdowns(&records).into_iter().map(|r| r.company).collect();
        assert_eq!(names, vec!["Britishvolt", "Small", "Unknown"]);
    }
}
