//! Exact-duplicate removal.
//!
//! The dataset has no primary key, so two rows are duplicates only when
//! every [`LayoffRecord`] field is equal. Rows sharing a full key are
//! numbered in file order; the first keeps rank 1 and every later copy is
//! dropped. Distinct events that happen to agree on every field collapse
//! too; that is accepted behavior.
//!
//! ```text
//! line  key   rank
//!   2   A      1   keep
//!   3   B      1   keep
//!   4   A      2   drop (duplicate of line 2)
//! ```

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{EventDate, LayoffRecord, StagedRecord};

/// A removed duplicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateRow {
    /// Source line of the removed copy
    pub line: usize,
    /// Position of this copy within its key group (always > 1)
    pub rank: usize,
    /// Source line of the copy that was kept
    pub kept_line: usize,
}

/// Outcome of one deduplication pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupReport {
    pub input_rows: usize,
    pub removed: Vec<DuplicateRow>,
}

impl DedupReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

/// Full-record equality key. Floats compare by bit pattern with `-0.0`
/// folded into `0.0`.
#[derive(Debug, PartialEq, Eq, Hash)]
struct RecordKey<'a> {
    company: &'a str,
    location: &'a str,
    industry: Option<&'a str>,
    total_laid_off: Option<i64>,
    percentage_laid_off: Option<u64>,
    event_date: Option<&'a EventDate>,
    stage: Option<&'a str>,
    country: &'a str,
    funds_raised_millions: Option<i64>,
}

impl<'a> RecordKey<'a> {
    fn of(record: &'a LayoffRecord) -> Self {
        Self {
            company: &record.company,
            location: &record.location,
            industry: record.industry.as_deref(),
            total_laid_off: record.total_laid_off,
            percentage_laid_off: record
                .percentage_laid_off
                .map(|p| if p == 0.0 { 0.0_f64.to_bits() } else { p.to_bits() }),
            event_date: record.event_date.as_ref(),
            stage: record.stage.as_deref(),
            country: &record.country,
            funds_raised_millions: record.funds_raised_millions,
        }
    }
}

/// Rank of every row within its full-key group, in input order (1-based).
pub fn duplicate_ranks(rows: &[StagedRecord]) -> Vec<usize> {
    let mut seen: HashMap<RecordKey<'_>, usize> = HashMap::new();
    rows.iter()
        .map(|row| {
            let count = seen.entry(RecordKey::of(&row.record)).or_insert(0);
            *count += 1;
            *count
        })
        .collect()
}

/// Drop every row ranked above 1 in its full-key group.
pub fn remove_duplicates(rows: Vec<StagedRecord>) -> (Vec<StagedRecord>, DedupReport) {
    let ranks = duplicate_ranks(&rows);
    let mut report = DedupReport {
        input_rows: rows.len(),
        removed: Vec::new(),
    };

    let keep: Vec<bool> = {
        let mut kept_lines: HashMap<RecordKey<'_>, usize> = HashMap::new();
        let keep = rows
            .iter()
            .zip(&ranks)
            .map(|(row, &rank)| {
                let key = RecordKey::of(&row.record);
                if rank == 1 {
                    kept_lines.insert(key, row.line);
                    return true;
                }
                report.removed.push(DuplicateRow {
                    line: row.line,
                    rank,
                    kept_line: kept_lines.get(&key).copied().unwrap_or_default(),
                });
                false
            })
            .collect();
        keep
    };

    let survivors = rows
        .into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect();

    (survivors, report)
}
