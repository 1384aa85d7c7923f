//! # Layoffs - cleaning and exploratory analysis of layoff events
//!
//! Turns a raw layoffs CSV export (one row per reported layoff event) into a
//! deduplicated, standardized record set and the aggregate tables built on it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│  Analysis   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │  (cleaning) │     │  (tables)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use layoffs::{run_file, PipelineOptions};
//! use std::path::Path;
//!
//! let report = run_file(Path::new("layoffs.csv"), &PipelineOptions::default()).unwrap();
//! println!("{} rows kept, {} months analyzed", report.cleaned.len(), report.analysis.monthly.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Pipeline progress logging
//! - [`models`] - Domain models (LayoffRecord, EventDate, Dimension)
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Staging, cleaning stages and pipeline
//! - [`analysis`] - Aggregates and rankings over cleaned records
//! - [`validation`] - Cleaned-record schema validation
//! - [`output`] - CSV and JSON writers

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Cleaning
pub mod transform;

// Analysis
pub mod analysis;

// Validation
pub mod validation;

// Output
pub mod output;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CleaningError, OutputError, PipelineError, RulesError, ValidationError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Dimension, EventDate, LayoffRecord, StagedRecord};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv,
    parse_csv_file_auto, CsvError, ParseResult,
};

// =============================================================================
// Re-exports - Cleaning
// =============================================================================

pub use transform::{
    default_rules, remove_duplicates, purge_unreliable, resolve_nulls, stage, standardize,
    DateErrorPolicy, IndustryRule, IndustryRules, StagingTable, Standardizer,
};

// =============================================================================
// Re-exports - Analysis
// =============================================================================

pub use analysis::{
    analyze, magnitude_summary, rolling_monthly_totals, shutdown_rates, top_companies_by_year,
    AnalysisOptions, AnalysisReport,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_layoff_record, validate_layoff_record, validate_records, ValidationStats};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    clean, run_bytes, run_file, run_parsed, CleaningReport, PipelineOptions, RunReport, SourceInfo,
};

pub use output::write_run;
