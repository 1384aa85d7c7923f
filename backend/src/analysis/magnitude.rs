//! Grouped magnitude summary: how large a typical layoff event is per category.
//!
//! ```text
//! stage      total   average
//! Post-IPO   204132  365.7
//! Series B    15311  110.1
//! ```

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Dimension, LayoffRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagnitudeRow {
    /// Category value; `None` groups rows where the dimension is null
    pub category: Option<String>,
    /// Rows in the group
    pub events: usize,
    /// Sum of `total_laid_off`, `None` when every row's total is null
    pub total_laid_off: Option<i64>,
    /// Mean of the non-null `total_laid_off` values
    pub average_laid_off: Option<f64>,
}

/// Accumulates one group while scanning.
#[derive(Default)]
struct GroupTotals {
    events: usize,
    sum: i64,
    counted: usize,
}

impl GroupTotals {
    fn add(&mut self, record: &LayoffRecord) {
        self.events += 1;
        if let Some(total) = record.total_laid_off {
            self.sum += total;
            self.counted += 1;
        }
    }

    fn build(self, category: Option<String>) -> MagnitudeRow {
        let (total_laid_off, average_laid_off) = if self.counted == 0 {
            (None, None)
        } else {
            (Some(self.sum), Some(self.sum as f64 / self.counted as f64))
        };
        MagnitudeRow {
            category,
            events: self.events,
            total_laid_off,
            average_laid_off,
        }
    }
}

/// Sum and mean of `total_laid_off` per category, sorted by mean descending.
///
/// Groups without any total sort last; ties break on category name.
pub fn magnitude_summary(records: &[LayoffRecord], by: Dimension) -> Vec<MagnitudeRow> {
    let mut groups: HashMap<Option<String>, GroupTotals> = HashMap::new();
    for record in records {
        groups.entry(by.key(record)).or_default().add(record);
    }

    let mut rows: Vec<MagnitudeRow> = groups
        .into_iter()
        .map(|(category, totals)| totals.build(category))
        .collect();

    rows.sort_by(|a, b| {
        desc_nulls_last(a.average_laid_off, b.average_laid_off).then_with(|| a.category.cmp(&b.category))
    });
    rows
}

/// Descending order with `None` after every value.
pub(crate) fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
