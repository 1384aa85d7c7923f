//! Null and blank resolution for `industry`.
//!
//! 1. Blank text becomes a real null, so one `is_none()` check covers both.
//! 2. Null industries are backfilled from another row of the same company.
//!    The lookup maps each company to the first non-null industry seen;
//!    companies with no such row stay null.

use serde::Serialize;
use std::collections::HashMap;

use crate::logs::{log_info_indent, log_success};
use crate::models::StagedRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NullReport {
    /// Blank industries turned into nulls
    pub blanks_nulled: usize,
    /// Null industries filled from the same company
    pub backfilled: usize,
    /// Rows whose industry is still null afterwards
    pub still_null: usize,
}

/// Phase 1: blank industry text becomes null.
pub fn normalize_blanks(rows: &mut [StagedRecord]) -> usize {
    let mut count = 0;
    for row in rows.iter_mut() {
        if row.record.industry.as_deref().is_some_and(|s| s.trim().is_empty()) {
            row.record.industry = None;
            count += 1;
        }
    }
    count
}

/// Company -> first non-null industry, in row order.
pub fn industry_lookup(rows: &[StagedRecord]) -> HashMap<String, String> {
    let mut lookup = HashMap::new();
    for row in rows {
        if let Some(industry) = &row.record.industry {
            lookup
                .entry(row.record.company.clone())
                .or_insert_with(|| industry.clone());
        }
    }
    lookup
}

/// Phase 2: copy a same-company industry into null rows.
pub fn backfill_industry(rows: &mut [StagedRecord]) -> usize {
    let lookup = industry_lookup(rows);
    let mut count = 0;
    for row in rows.iter_mut().filter(|r| r.record.industry.is_none()) {
        if let Some(industry) = lookup.get(&row.record.company) {
            row.record.industry = Some(industry.clone());
            count += 1;
        }
    }
    count
}

/// Run both phases.
pub fn resolve_nulls(rows: &mut [StagedRecord]) -> NullReport {
    let blanks_nulled = normalize_blanks(rows);
    let backfilled = backfill_industry(rows);
    let still_null = rows.iter().filter(|r| r.record.industry.is_none()).count();

    log_success(format!("Resolved industry nulls: {} filled from same company", backfilled));
    log_info_indent(format!("Blank industries nulled: {}", blanks_nulled), 1);
    log_info_indent(format!("Still null (no corroborating row): {}", still_null), 1);

    NullReport {
        blanks_nulled,
        backfilled,
        still_null,
    }
}
