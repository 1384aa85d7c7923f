//! Domain models for the layoffs pipeline.
//!
//! - [`LayoffRecord`] - One observed layoff event
//! - [`EventDate`] - Date column, raw text until standardization parses it
//! - [`StagedRecord`] - A working-table row tagged with its source line
//! - [`Dimension`] - Categorical axis used by grouped aggregates

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// Event Date
// =============================================================================

/// The `date` column of a layoff event.
///
/// Ingestion keeps the source text untouched; standardization replaces it
/// with a calendar date. A cleaned record set only contains [`EventDate::Date`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventDate {
    /// Source text, not yet parsed (`3/6/2023`).
    Text(String),
    /// Parsed calendar date.
    Date(NaiveDate),
}

impl EventDate {
    /// The calendar date, if this value has been parsed.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            EventDate::Date(d) => Some(*d),
            EventDate::Text(_) => None,
        }
    }
}

impl Serialize for EventDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EventDate::Text(s) => serializer.serialize_str(s),
            EventDate::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl std::fmt::Display for EventDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventDate::Text(s) => write!(f, "{}", s),
            EventDate::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

// =============================================================================
// Layoff Record
// =============================================================================

/// One observed layoff event.
///
/// Field order matches the dataset's column order, which is also the
/// column order of the cleaned CSV output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoffRecord {
    pub company: String,
    pub location: String,
    pub industry: Option<String>,
    pub total_laid_off: Option<i64>,
    pub percentage_laid_off: Option<f64>,
    #[serde(rename = "date")]
    pub event_date: Option<EventDate>,
    pub stage: Option<String>,
    pub country: String,
    pub funds_raised_millions: Option<i64>,
}

impl LayoffRecord {
    /// Parsed event date, `None` when missing or still raw text.
    pub fn date(&self) -> Option<NaiveDate> {
        self.event_date.as_ref().and_then(EventDate::date)
    }

    /// Year of the event date.
    pub fn year(&self) -> Option<i32> {
        self.date().map(|d| d.year())
    }

    /// Neither a head count nor a percentage: nothing to analyze.
    pub fn has_no_magnitude(&self) -> bool {
        self.total_laid_off.is_none() && self.percentage_laid_off.is_none()
    }

    /// Whole workforce laid off (`percentage_laid_off = 1`).
    pub fn is_full_shutdown(&self) -> bool {
        self.percentage_laid_off == Some(1.0)
    }
}

// =============================================================================
// Staged Record
// =============================================================================

/// A row of the working (staging) table.
///
/// `line` is the 1-based source line the row was read from. It identifies
/// the row in reports and is never part of record equality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagedRecord {
    pub line: usize,
    #[serde(flatten)]
    pub record: LayoffRecord,
}

impl StagedRecord {
    pub fn new(line: usize, record: LayoffRecord) -> Self {
        Self { line, record }
    }
}

// =============================================================================
// Dimension
// =============================================================================

/// Categorical axis for grouped aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Company,
    Location,
    Industry,
    Country,
    Stage,
    /// Year of the event date.
    Year,
}

impl Dimension {
    /// Category of `record` along this dimension. `None` is its own group.
    pub fn key(&self, record: &LayoffRecord) -> Option<String> {
        match self {
            Dimension::Company => Some(record.company.clone()),
            Dimension::Location => Some(record.location.clone()),
            Dimension::Industry => record.industry.clone(),
            Dimension::Country => Some(record.country.clone()),
            Dimension::Stage => record.stage.clone(),
            Dimension::Year => record.year().map(|y| y.to_string()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Company => "company",
            Dimension::Location => "location",
            Dimension::Industry => "industry",
            Dimension::Country => "country",
            Dimension::Stage => "stage",
            Dimension::Year => "year",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;

    #[test]
    fn test_event_date_serializes_as_iso() {
        let mut r = record("Acme");
        r.event_date = Some(EventDate::Date(NaiveDate::from_ymd_opt(2023, 3, 6).unwrap()));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["date"], "2023-03-06");
    }

    #[test]
    fn test_raw_date_has_no_year() {
        let mut r = record("Acme");
        r.event_date = Some(EventDate::Text("3/6/2023".into()));
        assert_eq!(r.year(), None);
        assert_eq!(r.event_date.unwrap().to_string(), "3/6/2023");
    }

    #[test]
    fn test_dimension_keys() {
        let r = record("Acme");
        assert_eq!(Dimension::Company.key(&r).as_deref(), Some("Acme"));
        assert_eq!(Dimension::Year.key(&r).as_deref(), Some("2022"));

        let mut no_stage = r.clone();
        no_stage.stage = None;
        assert_eq!(Dimension::Stage.key(&no_stage), None);
    }

    #[test]
    fn test_magnitude_flags() {
        let mut r = record("Acme");
        assert!(!r.has_no_magnitude());
        r.total_laid_off = None;
        r.percentage_laid_off = None;
        assert!(r.has_no_magnitude());

        r.percentage_laid_off = Some(1.0);
        assert!(r.is_full_shutdown());
    }
}
