//! Writers for the cleaned table, the analytical tables and the run report.
//!
//! Layout of an output directory:
//!
//! ```text
//! out/
//! ├── cleaned.csv
//! ├── magnitude_by_<dim>.csv
//! ├── shutdown_rate_by_<dim>.csv
//! ├── monthly_rolling_total.csv
//! ├── top_companies_by_year.csv
//! ├── totals_by_<dim>.csv
//! ├── full_shutdowns.csv
//! └── report.json
//! ```

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::analysis::{CategoryTotal, CompanyYearRank, MagnitudeRow, MonthlyTotal, ShutdownRateRow};
use crate::error::OutputResult;
use crate::logs::log_success;
use crate::models::LayoffRecord;
use crate::parser::COLUMNS;
use crate::transform::pipeline::RunReport;

/// A row type written as one CSV table.
///
/// `HEADER` lists the serialized field names in order, so an empty table
/// still carries its columns.
pub trait CsvRow: Serialize {
    const HEADER: &'static [&'static str];
}

impl CsvRow for LayoffRecord {
    const HEADER: &'static [&'static str] = &COLUMNS;
}

impl CsvRow for MagnitudeRow {
    const HEADER: &'static [&'static str] = &["category", "events", "total_laid_off", "average_laid_off"];
}

impl CsvRow for ShutdownRateRow {
    const HEADER: &'static [&'static str] =
        &["category", "total_companies", "shutdown_companies", "shutdown_rate"];
}

impl CsvRow for MonthlyTotal {
    const HEADER: &'static [&'static str] = &["month", "total_laid_off", "rolling_total"];
}

impl CsvRow for CompanyYearRank {
    const HEADER: &'static [&'static str] = &["company", "year", "total_laid_off", "rank"];
}

impl CsvRow for CategoryTotal {
    const HEADER: &'static [&'static str] = &["category", "total_laid_off"];
}

/// Write the header, then one record per row.
pub fn write_csv<T: CsvRow, W: Write>(writer: W, rows: &[T]) -> OutputResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(T::HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render rows as a CSV string.
pub fn to_csv_string<T: CsvRow>(rows: &[T]) -> OutputResult<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, rows)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write rows to a CSV file.
pub fn write_csv_file<T: CsvRow>(path: &Path, rows: &[T]) -> OutputResult<()> {
    let file = fs::File::create(path)?;
    write_csv(file, rows)
}

/// Write a value as pretty JSON.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> OutputResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn write_table<T: CsvRow>(
    dir: &Path,
    name: String,
    rows: &[T],
    written: &mut Vec<PathBuf>,
) -> OutputResult<()> {
    let path = dir.join(name);
    write_csv_file(&path, rows)?;
    written.push(path);
    Ok(())
}

/// Write every table of a run into `dir`, creating it if needed.
///
/// Returns the written paths in the order above.
pub fn write_run(dir: &Path, report: &RunReport) -> OutputResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let analysis = &report.analysis;
    let mut written = Vec::new();

    write_table(dir, "cleaned.csv".into(), &report.cleaned, &mut written)?;
    write_table(dir, format!("magnitude_by_{}.csv", analysis.magnitude_by), &analysis.magnitude, &mut written)?;
    write_table(
        dir,
        format!("shutdown_rate_by_{}.csv", analysis.shutdown_by),
        &analysis.shutdown_rates,
        &mut written,
    )?;
    write_table(dir, "monthly_rolling_total.csv".into(), &analysis.monthly, &mut written)?;
    write_table(dir, "top_companies_by_year.csv".into(), &analysis.top_companies, &mut written)?;
    write_table(dir, format!("totals_by_{}.csv", analysis.totals_by), &analysis.totals, &mut written)?;
    write_table(dir, "full_shutdowns.csv".into(), &analysis.full_shutdowns, &mut written)?;

    let report_path = dir.join("report.json");
    write_json_file(&report_path, report)?;
    written.push(report_path);

    log_success(format!("Wrote {} files to {}", written.len(), dir.display()));
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;
    use crate::transform::pipeline::{run_bytes, PipelineOptions};

    #[test]
    fn test_cleaned_csv_column_order() {
        let csv = to_csv_string(&[record("Acme")]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "company,location,industry,total_laid_off,percentage_laid_off,date,stage,country,funds_raised_millions"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Acme,SF Bay Area,Retail,100,0.1,2022-11-01,Post-IPO,United States,250"
        );
    }

    #[test]
    fn test_nulls_written_as_empty_cells() {
        let rows = vec![MagnitudeRow {
            category: None,
            events: 1,
            total_laid_off: None,
            average_laid_off: None,
        }];
        let csv = to_csv_string(&rows).unwrap();
        assert_eq!(csv.lines().nth(1), Some(",1,,"));
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let rows: Vec<CompanyYearRank> = Vec::new();
        let csv = to_csv_string(&rows).unwrap();
        assert_eq!(csv, "company,year,total_laid_off,rank\n");
    }

    fn serialized_keys<T: CsvRow>(row: &T) -> Vec<String> {
        match serde_json::to_value(row).unwrap() {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("expected an object, got {other}"),
        }
    }

    fn assert_header_matches<T: CsvRow>(row: &T) {
        let mut keys = serialized_keys(row);
        let mut header: Vec<String> = T::HEADER.iter().map(|h| h.to_string()).collect();
        keys.sort();
        header.sort();
        assert_eq!(keys, header);
    }

    #[test]
    fn test_headers_match_serialized_fields() {
        assert_header_matches(&record("Acme"));
        assert_header_matches(&MagnitudeRow {
            category: None,
            events: 0,
            total_laid_off: None,
            average_laid_off: None,
        });
        assert_header_matches(&ShutdownRateRow {
            category: None,
            total_companies: 0,
            shutdown_companies: 0,
            shutdown_rate: None,
        });
        assert_header_matches(&MonthlyTotal {
            month: "2023-01".into(),
            total_laid_off: 0,
            rolling_total: 0,
        });
        assert_header_matches(&CompanyYearRank {
            company: "Acme".into(),
            year: 2023,
            total_laid_off: 0,
            rank: 1,
        });
        assert_header_matches(&CategoryTotal {
            category: None,
            total_laid_off: 0,
        });
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monthly.csv");
        let rows = vec![MonthlyTotal {
            month: "2023-01".into(),
            total_laid_off: 84714,
            rolling_total: 84714,
        }];

        write_csv_file(&path, &rows).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("month,total_laid_off,rolling_total\n2023-01,84714,84714"));
    }

    #[test]
    fn test_write_run_layout() {
        let csv = "company,location,industry,total_laid_off,percentage_laid_off,date,stage,country,funds_raised_millions\n\
                   Acme,SF Bay Area,Retail,100,0.1,11/1/2022,Post-IPO,United States,250\n\
                   Beta,Berlin,Food,20,1,1/5/2023,Seed,Germany,5";
        let report = run_bytes(csv.as_bytes(), &PipelineOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let written = write_run(&out, &report).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec![
                "cleaned.csv",
                "magnitude_by_stage.csv",
                "shutdown_rate_by_industry.csv",
                "monthly_rolling_total.csv",
                "top_companies_by_year.csv",
                "totals_by_company.csv",
                "full_shutdowns.csv",
                "report.json",
            ]
        );

        let shutdowns = fs::read_to_string(out.join("full_shutdowns.csv")).unwrap();
        assert_eq!(shutdowns.lines().count(), 2);
        let report_json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
        assert_eq!(report_json["cleaning"]["output_rows"], 2);
    }

    #[test]
    fn test_write_run_without_shutdowns_keeps_headers() {
        let csv = "company,location,industry,total_laid_off,percentage_laid_off,date,stage,country,funds_raised_millions\n\
                   Acme,SF Bay Area,Retail,100,0.1,11/1/2022,Post-IPO,United States,250";
        let report = run_bytes(csv.as_bytes(), &PipelineOptions::default()).unwrap();
        assert!(report.analysis.full_shutdowns.is_empty());
        let dir = tempfile::tempdir().unwrap();

        write_run(dir.path(), &report).unwrap();

        let shutdowns = fs::read_to_string(dir.path().join("full_shutdowns.csv")).unwrap();
        assert_eq!(
            shutdowns,
            "company,location,industry,total_laid_off,percentage_laid_off,date,stage,country,funds_raised_millions\n"
        );
    }
}
