//! Field standardization.
//!
//! Each rule touches one field and only commits a value that differs from
//! the current one, so running the pass on clean data changes nothing.
//!
//! | Field      | Rule                                              |
//! |------------|---------------------------------------------------|
//! | company    | trim surrounding whitespace                       |
//! | industry   | collapse prefix families ([`IndustryRules`])      |
//! | country    | strip trailing punctuation (`United States.`)     |
//! | date       | parse `month/day/yyyy` text into a calendar date  |
//! | location   | unchanged                                         |

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::rules::IndustryRules;
use crate::error::{CleaningError, CleaningResult};
use crate::logs::{log_info_indent, log_success, log_warning};
use crate::models::{EventDate, LayoffRecord, StagedRecord};

/// Source date layout.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// `%Y` alone accepts short years; the dataset always writes four digits.
static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("valid date regex"));

/// Punctuation that may trail a country name.
const COUNTRY_TRAILING: &[char] = &['.', ',', ';', ':'];

/// What to do with rows whose date text does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateErrorPolicy {
    /// Fail the run, listing every offending row.
    #[default]
    Abort,
    /// Drop the offending rows and report them.
    Skip,
}

/// A row whose date text did not match [`DATE_FORMAT`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateIssue {
    pub line: usize,
    pub company: String,
    pub value: String,
}

impl std::fmt::Display for DateIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} ({}): '{}'", self.line, self.company, self.value)
    }
}

/// Per-field change counts for one standardization pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StandardizeReport {
    pub companies_trimmed: usize,
    pub industries_unified: usize,
    pub countries_unified: usize,
    pub dates_parsed: usize,
    pub date_issues: Vec<DateIssue>,
    /// Rows dropped under [`DateErrorPolicy::Skip`]
    pub rows_skipped: usize,
}

impl StandardizeReport {
    pub fn changes(&self) -> usize {
        self.companies_trimmed + self.industries_unified + self.countries_unified + self.dates_parsed
    }
}

/// Which fields a single record had rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldChanges {
    pub company: bool,
    pub industry: bool,
    pub country: bool,
    pub date: bool,
}

/// Applies the field rules to records.
#[derive(Debug, Clone, Default)]
pub struct Standardizer {
    industry_rules: IndustryRules,
}

impl Standardizer {
    pub fn new(industry_rules: IndustryRules) -> Self {
        Self { industry_rules }
    }

    pub fn industry_rules(&self) -> &IndustryRules {
        &self.industry_rules
    }

    /// Standardize one record in place.
    ///
    /// A date that fails to parse is left as text and reported as the error
    /// value; the other fields are still standardized.
    pub fn apply(&self, record: &mut LayoffRecord) -> Result<FieldChanges, String> {
        let mut changes = self.apply_text_fields(record);
        changes.date = parse_record_date(record)?;
        Ok(changes)
    }

    /// Company, industry and country rules; never fails.
    pub fn apply_text_fields(&self, record: &mut LayoffRecord) -> FieldChanges {
        let mut changes = FieldChanges {
            company: commit(&mut record.company, trim_company),
            industry: false,
            country: commit(&mut record.country, strip_country_punctuation),
            date: false,
        };

        if let Some(industry) = record.industry.as_mut() {
            changes.industry = commit(industry, |v| {
                self.industry_rules.canonicalize(v).map(str::to_string)
            });
        }
        changes
    }
}

/// Replace raw date text with the parsed date. `Ok(true)` when the value
/// changed, `Err` with the text when it does not parse.
fn parse_record_date(record: &mut LayoffRecord) -> Result<bool, String> {
    if let Some(EventDate::Text(text)) = &record.event_date {
        let date = parse_event_date(text).ok_or_else(|| text.clone())?;
        record.event_date = Some(EventDate::Date(date));
        return Ok(true);
    }
    Ok(false)
}

/// Replace `field` with the rule's output when it differs.
fn commit(field: &mut String, rule: impl Fn(&str) -> Option<String>) -> bool {
    match rule(field) {
        Some(new) if new != *field => {
            *field = new;
            true
        }
        _ => false,
    }
}

fn trim_company(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (trimmed.len() != value.len()).then(|| trimmed.to_string())
}

/// Strip trailing punctuation and whitespace, in any interleaving, unless
/// nothing would be left of the name.
fn strip_country_punctuation(value: &str) -> Option<String> {
    let stripped = value.trim_end_matches(|c: char| c.is_whitespace() || COUNTRY_TRAILING.contains(&c));
    if stripped.is_empty() || stripped.len() == value.len() {
        return None;
    }
    Some(stripped.to_string())
}

/// Parse `month/day/yyyy` text.
pub fn parse_event_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if !DATE_SHAPE.is_match(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Standardize every staged row.
///
/// Date failures are collected across the whole table first, then handled
/// according to `policy`.
pub fn standardize(
    rows: &mut Vec<StagedRecord>,
    standardizer: &Standardizer,
    policy: DateErrorPolicy,
) -> CleaningResult<StandardizeReport> {
    let mut report = StandardizeReport::default();
    let mut failed_lines = HashSet::new();

    for row in rows.iter_mut() {
        let mut changes = standardizer.apply_text_fields(&mut row.record);
        match parse_record_date(&mut row.record) {
            Ok(parsed) => changes.date = parsed,
            Err(value) => {
                report.date_issues.push(DateIssue {
                    line: row.line,
                    company: row.record.company.clone(),
                    value,
                });
                failed_lines.insert(row.line);
            }
        }
        report.tally(changes);
    }

    for issue in &report.date_issues {
        log_warning(format!("Unparseable date at {}", issue));
    }

    if !report.date_issues.is_empty() {
        match policy {
            DateErrorPolicy::Abort => {
                return Err(CleaningError::InvalidDates(report.date_issues));
            }
            DateErrorPolicy::Skip => {
                let before = rows.len();
                rows.retain(|r| !failed_lines.contains(&r.line));
                report.rows_skipped = before - rows.len();
                log_warning(format!("Skipped {} rows with unparseable dates", report.rows_skipped));
            }
        }
    }

    log_success(format!("Standardized {} rows ({} field changes)", rows.len(), report.changes()));
    log_info_indent(format!("Companies trimmed: {}", report.companies_trimmed), 1);
    log_info_indent(format!("Industries unified: {}", report.industries_unified), 1);
    log_info_indent(format!("Countries unified: {}", report.countries_unified), 1);
    log_info_indent(format!("Dates parsed: {}", report.dates_parsed), 1);

    Ok(report)
}

impl StandardizeReport {
    fn tally(&mut self, changes: FieldChanges) {
        self.companies_trimmed += changes.company as usize;
        self.industries_unified += changes.industry as usize;
        self.countries_unified += changes.country as usize;
        self.dates_parsed += changes.date as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{record, staged};

    fn raw(company: &str, industry: &str, country: &str, date: &str) -> LayoffRecord {
        LayoffRecord {
            company: company.into(),
            industry: Some(industry.into()),
            country: country.into(),
            event_date: Some(EventDate::Text(date.into())),
            ..record("unused")
        }
    }

    #[test]
    fn test_apply_all_rules() {
        let mut r = raw("  E Inc. ", "Crypto Currency", "United States.", "12/16/2022");
        let changes = Standardizer::default().apply(&mut r).unwrap();

        assert_eq!(changes, FieldChanges { company: true, industry: true, country: true, date: true });
        assert_eq!(r.company, "E Inc.");
        assert_eq!(r.industry.as_deref(), Some("Crypto"));
        assert_eq!(r.country, "United States");
        assert_eq!(r.date(), NaiveDate::from_ymd_opt(2022, 12, 16));
    }

    #[test]
    fn test_location_untouched() {
        let mut r = raw("Acme", "Retail", "Germany", "1/2/2021");
        r.location = " Düsseldorf ".into();
        Standardizer::default().apply(&mut r).unwrap();
        assert_eq!(r.location, " Düsseldorf ");
    }

    #[test]
    fn test_standardization_is_idempotent() {
        let mut rows = staged(vec![
            raw(" Uber ", "CryptoCurrency", "United States.", "3/6/2023"),
            raw("Bolt", "Transportation", "Estonia", "11/28/2022"),
            raw("Zume", "Food", "United States. ", "1/5/2023"),
        ]);
        let standardizer = Standardizer::default();

        standardize(&mut rows, &standardizer, DateErrorPolicy::Abort).unwrap();
        let once = rows.clone();
        let second = standardize(&mut rows, &standardizer, DateErrorPolicy::Abort).unwrap();

        assert_eq!(rows, once);
        assert_eq!(second.changes(), 0);
        assert_eq!(rows[2].record.country, "United States");
    }

    #[test]
    fn test_country_without_punctuation_unchanged() {
        assert_eq!(strip_country_punctuation("Korea (Republic of)"), None);
        assert_eq!(strip_country_punctuation("United States"), None);
        assert_eq!(strip_country_punctuation("United States.."), Some("United States".into()));
        assert_eq!(strip_country_punctuation("."), None);
        assert_eq!(strip_country_punctuation("United States. "), Some("United States".into()));
        assert_eq!(strip_country_punctuation("United States ;. "), Some("United States".into()));
    }

    #[test]
    fn test_date_format() {
        assert_eq!(parse_event_date("3/6/2023"), NaiveDate::from_ymd_opt(2023, 3, 6));
        assert_eq!(parse_event_date("03/06/2023"), NaiveDate::from_ymd_opt(2023, 3, 6));
        assert_eq!(parse_event_date("3/6/23"), None);
        assert_eq!(parse_event_date("2023-03-06"), None);
        assert_eq!(parse_event_date("13/1/2023"), None);
        assert_eq!(parse_event_date("2/30/2023"), None);
    }

    #[test]
    fn test_bad_date_aborts_with_every_row() {
        let mut rows = staged(vec![
            raw("A", "Retail", "US", "1/1/2021"),
            raw("B", "Retail", "US", "soon"),
            raw("C", "Retail", "US", "2021/01/01"),
        ]);

        let err = standardize(&mut rows, &Standardizer::default(), DateErrorPolicy::Abort).unwrap_err();
        let CleaningError::InvalidDates(issues) = err;
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].line, 3);
        assert_eq!(issues[0].value, "soon");
        assert_eq!(issues[1].company, "C");
    }

    #[test]
    fn test_bad_date_skipped_not_nulled() {
        let mut rows = staged(vec![
            raw("A", "Retail", "US", "1/1/2021"),
            raw("B", "Retail", "US.", "soon"),
        ]);

        let report = standardize(&mut rows, &Standardizer::default(), DateErrorPolicy::Skip).unwrap();
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(report.date_issues.len(), 1);
        // the dropped row's text fields were still standardized and counted
        assert_eq!(report.countries_unified, 1);
        assert_eq!(report.dates_parsed, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.company, "A");
    }

    #[test]
    fn test_text_fields_standardized_despite_bad_date() {
        let mut r = raw(" Acme ", "Crypto Currency", "Canada.", "someday");
        let err = Standardizer::default().apply(&mut r).unwrap_err();

        assert_eq!(err, "someday");
        assert_eq!(r.company, "Acme");
        assert_eq!(r.industry.as_deref(), Some("Crypto"));
        assert_eq!(r.country, "Canada");
        assert_eq!(r.event_date, Some(EventDate::Text("someday".into())));
    }

    #[test]
    fn test_missing_date_is_not_an_issue() {
        let mut r = raw("A", "Retail", "US", "x");
        r.event_date = None;
        let changes = Standardizer::default().apply(&mut r).unwrap();
        assert!(!changes.date);
        assert_eq!(r.event_date, None);
    }
}
