//! Shutdown rate per category.
//!
//! Raw counts of companies that laid off their whole workforce are not
//! comparable across categories of very different size, so each count is
//! divided by the category's number of distinct companies.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::magnitude::desc_nulls_last;
use crate::models::{Dimension, LayoffRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShutdownRateRow {
    pub category: Option<String>,
    /// Distinct companies in the category
    pub total_companies: usize,
    /// Distinct companies with at least one `percentage_laid_off = 1` row
    pub shutdown_companies: usize,
    /// `shutdown_companies / total_companies * 100`, two decimals;
    /// `None` when the category has no companies
    pub shutdown_rate: Option<f64>,
}

/// Percentage rounded to two decimals, `None` for an empty denominator.
pub fn shutdown_rate(shutdown: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    let pct = shutdown as f64 / total as f64 * 100.0;
    Some((pct * 100.0).round() / 100.0)
}

/// Distinct-company shutdown rate per category, highest rate first.
pub fn shutdown_rates(records: &[LayoffRecord], by: Dimension) -> Vec<ShutdownRateRow> {
    let mut companies: HashMap<Option<String>, HashSet<&str>> = HashMap::new();
    let mut shutdowns: HashMap<Option<String>, HashSet<&str>> = HashMap::new();

    for record in records {
        let category = by.key(record);
        if record.is_full_shutdown() {
            shutdowns
                .entry(category.clone())
                .or_default()
                .insert(record.company.as_str());
        }
        companies
            .entry(category)
            .or_default()
            .insert(record.company.as_str());
    }

    let mut rows: Vec<ShutdownRateRow> = companies
        .into_iter()
        .map(|(category, members)| {
            let shutdown_companies = shutdowns.get(&category).map_or(0, HashSet::len);
            ShutdownRateRow {
                shutdown_rate: shutdown_rate(shutdown_companies, members.len()),
                total_companies: members.len(),
                shutdown_companies,
                category,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        desc_nulls_last(a.shutdown_rate, b.shutdown_rate).then_with(|| a.category.cmp(&b.category))
    });
    rows
}
