//! High-level pipeline API: ingestion, cleaning, validation and analysis.
//!
//! ```text
//! CSV ─▶ parse ─▶ stage ─▶ dedup ─▶ standardize ─▶ nulls ─▶ purge ─▶ dedup
//!                                                                      │
//!                        RunReport ◀── analyze ◀── validate ◀──────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use layoffs::transform::pipeline::{run_file, PipelineOptions};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = run_file(Path::new("layoffs.csv"), &PipelineOptions::default())?;
//!     println!("Cleaned {} rows", report.cleaned.len());
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use super::dedup::{remove_duplicates, DedupReport};
use super::nulls::{resolve_nulls, NullReport};
use super::purge::{purge_unreliable, PurgeReport};
use super::rules::IndustryRules;
use super::staging::{stage, StagingTable};
use super::standardize::{standardize, DateErrorPolicy, StandardizeReport, Standardizer};
use crate::analysis::{analyze, AnalysisOptions, AnalysisReport, DEFAULT_TOP_N};
use crate::error::{CleaningResult, PipelineError, PipelineResult};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::models::{Dimension, LayoffRecord};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};
use crate::validation::{validate_records, ValidationStats};

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Industry rule table to load instead of the built-in one
    pub rules_path: Option<String>,

    /// Handling of rows whose date does not parse
    pub on_bad_date: DateErrorPolicy,

    pub magnitude_by: Dimension,
    pub shutdown_by: Dimension,
    pub totals_by: Dimension,

    /// Ranks kept per year in the top-companies table
    pub top_n: usize,

    /// Skip the schema check of the cleaned records
    pub skip_validation: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            rules_path: None,
            on_bad_date: DateErrorPolicy::Abort,
            magnitude_by: Dimension::Stage,
            shutdown_by: Dimension::Industry,
            totals_by: Dimension::Company,
            top_n: DEFAULT_TOP_N,
            skip_validation: false,
        }
    }
}

impl PipelineOptions {
    /// Defaults overridden by `LAYOFFS_RULES`, `LAYOFFS_TOP_N` and
    /// `LAYOFFS_SKIP_BAD_DATES`.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(path) = get("LAYOFFS_RULES").filter(|p| !p.trim().is_empty()) {
            options.rules_path = Some(path);
        }

        if let Some(raw) = get("LAYOFFS_TOP_N") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => options.top_n = n,
                _ => log_warning(format!("Ignoring LAYOFFS_TOP_N='{}': expected a positive integer", raw)),
            }
        }

        if let Some(raw) = get("LAYOFFS_SKIP_BAD_DATES") {
            match parse_flag(&raw) {
                Some(true) => options.on_bad_date = DateErrorPolicy::Skip,
                Some(false) => options.on_bad_date = DateErrorPolicy::Abort,
                None => log_warning(format!("Ignoring LAYOFFS_SKIP_BAD_DATES='{}'", raw)),
            }
        }

        options
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            magnitude_by: self.magnitude_by,
            shutdown_by: self.shutdown_by,
            totals_by: self.totals_by,
            top_n: self.top_n,
        }
    }

    /// Load the configured rule table, or the built-in one.
    pub fn standardizer(&self) -> PipelineResult<Standardizer> {
        let rules = match &self.rules_path {
            Some(path) => {
                log_info(format!("Using industry rules from {}", path));
                IndustryRules::from_file(path)?
            }
            None => IndustryRules::default(),
        };
        Ok(Standardizer::new(rules))
    }
}

/// `1/true/yes` and `0/false/no`, any case.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Row accounting for one cleaning run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub duplicates: DedupReport,
    pub standardize: StandardizeReport,
    pub nulls: NullReport,
    pub purge: PurgeReport,
    /// Rows that became identical through normalization
    pub final_duplicates: DedupReport,
    pub output_rows: usize,
}

/// Run every cleaning stage over a staging table.
pub fn clean(
    table: StagingTable,
    standardizer: &Standardizer,
    policy: DateErrorPolicy,
) -> CleaningResult<(Vec<LayoffRecord>, CleaningReport)> {
    let input_rows = table.len();

    log_info("🔁 Removing duplicates...");
    let (mut rows, duplicates) = remove_duplicates(table.into_rows());
    log_success(format!("Removed {} duplicate rows", duplicates.removed_count()));

    log_info("✏️  Standardizing fields...");
    let standardized = standardize(&mut rows, standardizer, policy)?;

    log_info("🕳️  Resolving nulls...");
    let nulls = resolve_nulls(&mut rows);

    let purge = purge_unreliable(&mut rows);

    let (rows, final_duplicates) = remove_duplicates(rows);
    if final_duplicates.removed_count() > 0 {
        log_warning(format!(
            "Removed {} rows made identical by standardization",
            final_duplicates.removed_count()
        ));
    }

    let records: Vec<LayoffRecord> = rows.into_iter().map(|row| row.record).collect();
    log_success(format!("Cleaned {} → {} rows", input_rows, records.len()));

    let report = CleaningReport {
        input_rows,
        duplicates,
        standardize: standardized,
        nulls,
        purge,
        final_duplicates,
        output_rows: records.len(),
    };
    Ok((records, report))
}

/// Source file information
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub path: Option<String>,
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source: SourceInfo,
    pub options: PipelineOptions,
    pub cleaning: CleaningReport,
    /// `None` when validation was skipped
    pub validation: Option<ValidationStats>,
    /// Written to `cleaned.csv`, not to the JSON report
    #[serde(skip)]
    pub cleaned: Vec<LayoffRecord>,
    pub analysis: AnalysisReport,
}

/// Clean and analyze a layoffs CSV file.
///
/// # Errors
/// Fails when the file is unreadable or malformed, when the rule table
/// cannot be loaded, when the file has no rows, or when a date does not
/// parse under [`DateErrorPolicy::Abort`].
pub fn run_file(path: &Path, options: &PipelineOptions) -> PipelineResult<RunReport> {
    let parse_result = parse_csv_file_auto(path)?;
    run_parsed(parse_result, options, Some(path))
}

/// Same as [`run_file`] for raw CSV bytes.
pub fn run_bytes(bytes: &[u8], options: &PipelineOptions) -> PipelineResult<RunReport> {
    let parse_result = parse_bytes_auto(bytes)?;
    run_parsed(parse_result, options, None)
}

/// Clean and analyze already-parsed CSV data.
pub fn run_parsed(
    parse_result: ParseResult,
    options: &PipelineOptions,
    source_path: Option<&Path>,
) -> PipelineResult<RunReport> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4().to_string();

    log_info("📖 Reading CSV file...");
    log_success(format!("Detected encoding: {}", parse_result.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parse_result.delimiter)));
    log_success(format!("Read {} rows", parse_result.records.len()));

    let source = SourceInfo {
        path: source_path.map(|p| p.display().to_string()),
        encoding: parse_result.encoding.clone(),
        delimiter: parse_result.delimiter,
        headers: parse_result.headers.clone(),
        row_count: parse_result.records.len(),
    };

    if parse_result.records.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let standardizer = options.standardizer()?;
    let table = stage(&parse_result);
    let (cleaned, cleaning) = clean(table, &standardizer, options.on_bad_date)?;

    let validation = if options.skip_validation {
        log_info("(validation skipped)");
        None
    } else {
        log_info("✔️  Validating cleaned records...");
        let stats = validate_records(&cleaned)?;
        print_validation_result(&stats);
        Some(stats)
    };

    log_info("📊 Analyzing...");
    let analysis = analyze(&cleaned, &options.analysis_options());
    log_success(format!(
        "{} months, {} ranked company-years, {} full shutdowns",
        analysis.monthly.len(),
        analysis.top_companies.len(),
        analysis.full_shutdowns.len()
    ));

    Ok(RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        source,
        options: options.clone(),
        cleaning,
        validation,
        cleaned,
        analysis,
    })
}

/// Display name for a detected delimiter.
pub fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

fn print_validation_result(stats: &ValidationStats) {
    if stats.is_clean() {
        log_success(format!("All {} records valid", stats.valid));
        return;
    }
    log_warning(format!("{} valid, {} invalid", stats.valid, stats.invalid));
    for record in stats.errors.iter().take(3) {
        log_error(format!("Record {}: {}", record.record_index, record.errors.join(", ")));
    }
    if stats.errors.len() > 3 {
        log_info_indent(format!("... and {} more", stats.errors.len() - 3), 1);
    }
}
