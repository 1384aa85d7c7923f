//! Removal of rows without any layoff magnitude.
//!
//! A row with neither `total_laid_off` nor `percentage_laid_off` cannot
//! contribute to any aggregate. Runs after standardization and backfill.

use serde::Serialize;

use crate::logs::log_warning;
use crate::models::StagedRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PurgeReport {
    /// Source lines of the removed rows
    pub purged_lines: Vec<usize>,
}

impl PurgeReport {
    pub fn purged_count(&self) -> usize {
        self.purged_lines.len()
    }
}

/// Drop rows where both magnitude columns are null.
pub fn purge_unreliable(rows: &mut Vec<StagedRecord>) -> PurgeReport {
    let mut report = PurgeReport::default();
    rows.retain(|row| {
        if row.record.has_no_magnitude() {
            report.purged_lines.push(row.line);
            false
        } else {
            true
        }
    });

    if report.purged_count() > 0 {
        log_warning(format!(
            "Purged {} rows with neither total nor percentage laid off",
            report.purged_count()
        ));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{record, staged};
    use crate::models::LayoffRecord;

    fn magnitude(total: Option<i64>, pct: Option<f64>) -> LayoffRecord {
        LayoffRecord {
            total_laid_off: total,
            percentage_laid_off: pct,
            ..record("Acme")
        }
    }

    #[test]
    fn test_purge_only_rows_missing_both() {
        let mut rows = staged(vec![
            magnitude(None, None),
            magnitude(Some(10), None),
            magnitude(None, Some(0.5)),
            magnitude(Some(10), Some(0.5)),
        ]);

        let report = purge_unreliable(&mut rows);

        assert_eq!(rows.len(), 3);
        assert_eq!(report.purged_lines, vec![2]);
    }

    #[test]
    fn test_zero_is_a_value() {
        let mut rows = staged(vec![magnitude(Some(0), None)]);
        purge_unreliable(&mut rows);
        assert_eq!(rows.len(), 1);
    }
}
