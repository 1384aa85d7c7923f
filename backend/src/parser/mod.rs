//! Layoff dataset ingestion with encoding and delimiter auto-detection.
//!
//! Reads the raw CSV into typed rows without cleaning anything: text
//! columns keep their original spelling and the date stays as source text.
//! Only representational nulls (blank cells, the literal `NULL`) of typed
//! columns are interpreted here.

use std::collections::HashMap;
use std::path::Path;

use crate::models::{EventDate, LayoffRecord, StagedRecord};

/// CSV parsing error with context
#[derive(Debug, Clone)]
pub struct CsvError {
    pub line: usize,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl std::fmt::Display for CsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => {
                write!(f, "Line {}, column '{}' (value '{}'): {}", self.line, col, val, self.message)
            }
            (Some(col), None) => {
                write!(f, "Line {}, column '{}': {}", self.line, col, self.message)
            }
            _ => {
                write!(f, "Line {}: {}", self.line, self.message)
            }
        }
    }
}

impl std::error::Error for CsvError {}

impl CsvError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Source rows, in file order
    pub records: Vec<StagedRecord>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers as they appear in the file
    pub headers: Vec<String>,
}

/// Dataset columns, in file order.
pub const COLUMNS: [&str; 9] = [
    "company",
    "location",
    "industry",
    "total_laid_off",
    "percentage_laid_off",
    "date",
    "stage",
    "country",
    "funds_raised_millions",
];

/// Marker the dataset uses for missing values.
const NULL_MARKER: &str = "NULL";

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8, ASCII and anything unknown
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse a layoffs CSV file with auto-detection of encoding and delimiter.
///
/// An unreadable file is reported as a line-0 error; callers treat it as fatal.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> Result<ParseResult, CsvError> {
    let bytes = std::fs::read(path.as_ref()).map_err(|e| {
        CsvError::new(0, format!("Cannot read file '{}': {}", path.as_ref().display(), e))
    })?;

    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParseResult, CsvError> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    parse_string_with_metadata(&content, delimiter, encoding)
}

/// Parse CSV text with an explicit delimiter.
pub fn parse_csv(content: &str, delimiter: char) -> Result<Vec<StagedRecord>, CsvError> {
    parse_string_with_metadata(content, delimiter, "utf-8".to_string()).map(|r| r.records)
}

/// Parse CSV string with explicit delimiter and return metadata.
pub fn parse_string_with_metadata(
    content: &str,
    delimiter: char,
    encoding: String,
) -> Result<ParseResult, CsvError> {
    if content.trim().is_empty() {
        return Err(CsvError::new(1, "Empty CSV file"));
    }

    let delimiter_byte = u8::try_from(delimiter)
        .map_err(|_| CsvError::new(0, format!("Delimiter '{}' is not a single byte", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CsvError::new(1, format!("Cannot read header: {}", e)))?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::new(1, "No headers found"));
    }

    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| {
            let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
            CsvError::new(line, format!("Invalid CSV row: {}", e))
        })?;
        let line = row.position().map(|p| p.line() as usize).unwrap_or(0);

        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let record = columns.read_record(&row, line)?;
        records.push(StagedRecord::new(line, record));
    }

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

/// Position of every dataset column in the file's header row.
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, CsvError> {
        let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        let mut positions = HashMap::new();

        for column in COLUMNS {
            let found = lowered
                .iter()
                .position(|h| h == column || (column == "date" && h == "event_date"));
            match found {
                Some(idx) => {
                    positions.insert(column, idx);
                }
                None => {
                    return Err(CsvError::new(1, "Missing required column").with_column(column));
                }
            }
        }

        Ok(Self { positions })
    }

    fn cell<'r>(&self, row: &'r csv::StringRecord, column: &'static str) -> &'r str {
        self.positions
            .get(column)
            .and_then(|&idx| row.get(idx))
            .unwrap_or("")
    }

    fn read_record(&self, row: &csv::StringRecord, line: usize) -> Result<LayoffRecord, CsvError> {
        let industry = self.cell(row, "industry");
        let percentage = parse_decimal(self.cell(row, "percentage_laid_off"), line, "percentage_laid_off")?;

        if let Some(p) = percentage {
            if !(0.0..=1.0).contains(&p) {
                return Err(CsvError::new(line, "Percentage must be between 0 and 1")
                    .with_column("percentage_laid_off")
                    .with_value(self.cell(row, "percentage_laid_off")));
            }
        }

        Ok(LayoffRecord {
            company: self.cell(row, "company").to_string(),
            location: self.cell(row, "location").to_string(),
            // Blank industry stays blank; only the explicit marker is a null here.
            industry: if is_null_marker(industry) { None } else { Some(industry.to_string()) },
            total_laid_off: parse_integer(self.cell(row, "total_laid_off"), line, "total_laid_off")?,
            percentage_laid_off: percentage,
            event_date: nullable_text(self.cell(row, "date")).map(EventDate::Text),
            stage: nullable_text(self.cell(row, "stage")),
            country: self.cell(row, "country").to_string(),
            funds_raised_millions: parse_integer(
                self.cell(row, "funds_raised_millions"),
                line,
                "funds_raised_millions",
            )?,
        })
    }
}

fn is_null_marker(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case(NULL_MARKER)
}

fn is_null(raw: &str) -> bool {
    raw.trim().is_empty() || is_null_marker(raw)
}

fn nullable_text(raw: &str) -> Option<String> {
    if is_null(raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Non-negative whole number; every integer column is a count or an amount.
fn parse_integer(raw: &str, line: usize, column: &str) -> Result<Option<i64>, CsvError> {
    if is_null(raw) {
        return Ok(None);
    }
    let text = raw.trim();
    let invalid = |message: &str| {
        CsvError::new(line, message.to_string())
            .with_column(column)
            .with_value(raw)
    };

    let value = match text.parse::<i64>() {
        Ok(n) => n,
        // Spreadsheet exports write whole numbers as "12.0"
        Err(_) => match text.parse::<f64>() {
            Ok(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => f as i64,
            Ok(f) if f.is_finite() && f.fract() == 0.0 => return Err(invalid("Integer out of range")),
            _ => return Err(invalid("Expected an integer")),
        },
    };

    if value < 0 {
        return Err(invalid("Must not be negative"));
    }
    Ok(Some(value))
}

fn parse_decimal(raw: &str, line: usize, column: &str) -> Result<Option<f64>, CsvError> {
    if is_null(raw) {
        return Ok(None);
    }
    raw.trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| CsvError::new(line, "Expected a decimal number").with_column(column).with_value(raw))
}
