//! JSON Schema validation of cleaned layoff records.
//!
//! The embedded schema (`schemas/layoff-record-clean.json`, draft 7)
//! restates the post-cleaning invariants so a cleaned export can be
//! checked independently of the code that produced it:
//!
//! - `industry` is null or non-blank text
//! - `percentage_laid_off` lies in `[0, 1]`
//! - `date` is null or an ISO `YYYY-MM-DD` string
//! - `country` has no trailing punctuation
//! - at least one of `total_laid_off` / `percentage_laid_off` is present
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use layoffs::validation::validate_layoff_record;
//!
//! let row = json!({
//!     "company": "Atlassian", "location": "Sydney", "industry": "Other",
//!     "total_laid_off": 500, "percentage_laid_off": 0.05, "date": "2023-03-06",
//!     "stage": "Post-IPO", "country": "Australia", "funds_raised_millions": 210
//! });
//! assert!(validate_layoff_record(&row).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::models::LayoffRecord;

static CLEAN_RECORD_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/layoff-record-clean.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate one cleaned record (as JSON).
pub fn validate_layoff_record(data: &Value) -> Result<(), Vec<String>> {
    validate(&CLEAN_RECORD_SCHEMA, data)
}

/// Quick check against the cleaned-record schema.
pub fn is_valid_layoff_record(data: &Value) -> bool {
    is_valid(&CLEAN_RECORD_SCHEMA, data)
}

/// Errors for one record of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordErrors {
    pub record_index: usize,
    pub errors: Vec<String>,
}

/// Validation statistics for a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationStats {
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<RecordErrors>,
}

impl ValidationStats {
    pub fn is_clean(&self) -> bool {
        self.invalid == 0
    }
}

/// Validate a batch of JSON values, compiling the schema once.
pub fn validate_values(values: &[Value]) -> Result<ValidationStats, ValidationError> {
    let validator = jsonschema::draft7::new(&CLEAN_RECORD_SCHEMA)
        .map_err(|e| ValidationError::InvalidSchema(e.to_string()))?;

    let mut stats = ValidationStats::default();
    for (record_index, value) in values.iter().enumerate() {
        let errors: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
        if errors.is_empty() {
            stats.valid += 1;
        } else {
            stats.invalid += 1;
            stats.errors.push(RecordErrors { record_index, errors });
        }
    }
    Ok(stats)
}

/// Validate cleaned records.
pub fn validate_records(records: &[LayoffRecord]) -> Result<ValidationStats, ValidationError> {
    let values: Vec<Value> = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| ValidationError::SchemaError { errors: vec![e.to_string()] })?;
    validate_values(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;
    use crate::models::EventDate;
    use serde_json::json;

    fn valid_row() -> Value {
        json!({
            "company": "Atlassian",
            "location": "Sydney",
            "industry": "Other",
            "total_laid_off": 500,
            "percentage_laid_off": 0.05,
            "date": "2023-03-06",
            "stage": "Post-IPO",
            "country": "Australia",
            "funds_raised_millions": 210
        })
    }

    #[test]
    fn test_valid_record() {
        assert!(is_valid_layoff_record(&valid_row()));
    }

    #[test]
    fn test_nullable_fields() {
        let mut row = valid_row();
        row["industry"] = Value::Null;
        row["total_laid_off"] = Value::Null;
        row["date"] = Value::Null;
        row["stage"] = Value::Null;
        row["funds_raised_millions"] = Value::Null;
        assert!(validate_layoff_record(&row).is_ok());
    }

    #[test]
    fn test_blank_industry_rejected() {
        let mut row = valid_row();
        row["industry"] = json!("");
        assert!(!is_valid_layoff_record(&row));
    }

    #[test]
    fn test_no_magnitude_rejected() {
        let mut row = valid_row();
        row["total_laid_off"] = Value::Null;
        row["percentage_laid_off"] = Value::Null;
        let errors = validate_layoff_record(&row).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_trailing_country_punctuation_rejected() {
        let mut row = valid_row();
        row["country"] = json!("United States.");
        assert!(!is_valid_layoff_record(&row));
    }

    #[test]
    fn test_raw_date_text_rejected() {
        let mut row = valid_row();
        row["date"] = json!("3/6/2023");
        assert!(!is_valid_layoff_record(&row));
    }

    #[test]
    fn test_batch_stats() {
        let good = record("Acme");
        let mut raw_date = record("Beta");
        raw_date.event_date = Some(EventDate::Text("3/6/2023".into()));

        let stats = validate_records(&[good.clone(), raw_date, good]).unwrap();
        assert_eq!(stats.valid, 2);
        assert_eq!(stats.invalid, 1);
        assert_eq!(stats.errors[0].record_index, 1);
        assert!(!stats.is_clean());
    }
}
