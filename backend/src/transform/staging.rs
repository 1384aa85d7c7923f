//! Staging: the mutable working copy of the source dataset.
//!
//! Cleaning never touches [`ParseResult::records`]; it works on the
//! copy returned by [`stage`], so the source stays available for audit.

use crate::models::StagedRecord;
use crate::parser::ParseResult;

/// Working table owned by the cleaning stage.
#[derive(Debug, Clone, Default)]
pub struct StagingTable {
    rows: Vec<StagedRecord>,
}

impl StagingTable {
    pub fn rows(&self) -> &[StagedRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<StagedRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Copy every source row into a new working table, unfiltered.
pub fn stage(source: &ParseResult) -> StagingTable {
    StagingTable {
        rows: source.records.clone(),
    }
}
