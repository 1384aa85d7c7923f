//! Top companies per year by total laid off, with dense ranking.
//!
//! Ties share a rank and the next distinct total takes the next integer:
//!
//! ```text
//! A 100 -> 1
//! B 100 -> 1
//! C  50 -> 2
//! ```

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::LayoffRecord;

/// Default number of ranks reported per year.
pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyYearRank {
    pub company: String,
    pub year: i32,
    pub total_laid_off: i64,
    pub rank: usize,
}

/// Dense ranks for `values` in descending order, in input positions.
pub fn dense_rank_desc(values: &[i64]) -> Vec<usize> {
    let mut distinct: Vec<i64> = values.to_vec();
    distinct.sort_unstable_by(|a, b| b.cmp(a));
    distinct.dedup();

    values
        .iter()
        .map(|v| distinct.partition_point(|d| d > v) + 1)
        .collect()
}

/// Per year, companies ranked by summed `total_laid_off`; ranks `1..=top_n`.
///
/// Company-years without any dated, non-null total are not ranked.
/// Output is ordered by year, rank, then company.
pub fn top_companies_by_year(records: &[LayoffRecord], top_n: usize) -> Vec<CompanyYearRank> {
    let mut sums: BTreeMap<i32, HashMap<&str, i64>> = BTreeMap::new();
    for record in records {
        if let (Some(year), Some(total)) = (record.year(), record.total_laid_off) {
            *sums.entry(year).or_default().entry(record.company.as_str()).or_insert(0) += total;
        }
    }

    let mut ranked = Vec::new();
    for (year, companies) in sums {
        let mut entries: Vec<(&str, i64)> = companies.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let totals: Vec<i64> = entries.iter().map(|(_, t)| *t).collect();
        let ranks = dense_rank_desc(&totals);

        ranked.extend(
            entries
                .into_iter()
                .zip(ranks)
                .filter(|(_, rank)| *rank <= top_n)
                .map(|((company, total), rank)| CompanyYearRank {
                    company: company.to_string(),
                    year,
                    total_laid_off: total,
                    rank,
                }),
        );
    }
    ranked
}
