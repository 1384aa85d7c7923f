//! Error types for the layoffs pipeline.
//!
//! - [`CsvError`] - Ingestion errors (defined next to the parser)
//! - [`RulesError`] - Industry rule table errors
//! - [`CleaningError`] - Cleaning stage errors
//! - [`ValidationError`] - Schema validation errors
//! - [`OutputError`] - Writing tables and reports
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

pub use crate::parser::CsvError;
use crate::transform::standardize::DateIssue;

// =============================================================================
// Rule Table Errors
// =============================================================================

/// Errors loading or checking the industry rule table.
#[derive(Debug, Error)]
pub enum RulesError {
    /// IO error.
    #[error("Rules IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Rules JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The table is malformed or not idempotent.
    #[error("Invalid industry rules: {0}")]
    InvalidRules(String),
}

// =============================================================================
// Cleaning Errors
// =============================================================================

/// Errors during cleaning.
#[derive(Debug, Error)]
pub enum CleaningError {
    /// Date text did not match the expected format.
    #[error("{} row(s) have an unparseable date: {}", .0.len(), describe_issues(.0))]
    InvalidDates(Vec<DateIssue>),
}

fn describe_issues(issues: &[DateIssue]) -> String {
    let mut shown: Vec<String> = issues.iter().take(5).map(|i| i.to_string()).collect();
    if issues.len() > shown.len() {
        shown.push(format!("... and {} more", issues.len() - shown.len()));
    }
    shown.join("; ")
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors during schema validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema validation failed.
    #[error("Validation failed: {errors:?}")]
    SchemaError { errors: Vec<String> },

    /// The schema itself could not be compiled.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors writing result tables and reports.
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error.
    #[error("Output IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV write error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON error.
    #[error("JSON write error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::run_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Ingestion error; the source is unavailable or malformed.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Rule table error.
    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    /// Cleaning error.
    #[error("Cleaning error: {0}")]
    Cleaning(#[from] CleaningError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Output error.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// No records to clean.
    #[error("No records to clean")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for rule table operations.
pub type RulesResult<T> = Result<T, RulesError>;

/// Result type for cleaning operations.
pub type CleaningResult<T> = Result<T, CleaningError>;

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::new(0, "Cannot read file 'x.csv'");
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("x.csv"));

        // RulesError -> PipelineError
        let rules_err = RulesError::InvalidRules("empty prefix".into());
        let pipeline_err: PipelineError = rules_err.into();
        assert!(pipeline_err.to_string().contains("empty prefix"));
    }

    #[test]
    fn test_invalid_dates_message_lists_rows() {
        let issues: Vec<DateIssue> = (0..7)
            .map(|i| DateIssue {
                line: i + 2,
                company: "Acme".into(),
                value: "2023-13-01".into(),
            })
            .collect();
        let msg = CleaningError::InvalidDates(issues).to_string();

        assert!(msg.starts_with("7 row(s)"));
        assert!(msg.contains("line 2"));
        assert!(msg.contains("and 2 more"));
    }
}
