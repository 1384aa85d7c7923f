//! Layoffs CLI - clean and explore a layoffs CSV export
//!
//! # Main Commands
//!
//! ```bash
//! layoffs run layoffs.csv --out-dir out    # Clean, analyze and write every table
//! layoffs clean layoffs.csv -o clean.csv   # Cleaning only
//! layoffs analyze layoffs.csv --top 3      # Print the analysis report as JSON
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! layoffs parse layoffs.csv                # Just parse CSV to JSON
//! layoffs validate records.json            # Validate cleaned records against the schema
//! layoffs rules                            # Show the built-in industry rules
//! ```
//!
//! `<input>` falls back to `LAYOFFS_INPUT` and `--out-dir` to `LAYOFFS_OUT_DIR`;
//! both may come from a `.env` file.

use clap::{Args, Parser, Subcommand};
use layoffs::logs::init_logging;
use layoffs::output::write_csv_file;
use layoffs::transform::pipeline::format_delimiter;
use layoffs::validation::validate_values;
use layoffs::{
    clean, default_rules, parse_csv_file_auto, run_file, stage, write_run, DateErrorPolicy,
    Dimension, PipelineOptions, RunReport,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "layoffs")]
#[command(about = "Clean and explore the company layoffs dataset", long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output the staged rows as JSON
    Parse {
        /// Input CSV file (default: $LAYOFFS_INPUT)
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clean a CSV file and write the cleaned table as CSV
    Clean {
        /// Input CSV file (default: $LAYOFFS_INPUT)
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        cleaning: CleaningArgs,
    },

    /// Clean and analyze, output the analysis report as JSON
    Analyze {
        /// Input CSV file (default: $LAYOFFS_INPUT)
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        cleaning: CleaningArgs,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Full pipeline: cleaned table, every result table and report.json
    Run {
        /// Input CSV file (default: $LAYOFFS_INPUT)
        input: Option<PathBuf>,

        /// Output directory (default: $LAYOFFS_OUT_DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        cleaning: CleaningArgs,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Validate a JSON array of cleaned records against the schema
    Validate {
        /// Input JSON file (array of records)
        input: PathBuf,
    },

    /// Show the built-in industry rules
    Rules,
}

#[derive(Args)]
struct CleaningArgs {
    /// Industry rules JSON file (default: $LAYOFFS_RULES or built-in)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Drop rows with unparseable dates instead of failing
    #[arg(long)]
    skip_bad_dates: bool,

    /// Skip schema validation of the cleaned records
    #[arg(long)]
    no_validate: bool,
}

#[derive(Args)]
struct AnalysisArgs {
    /// Dimension for the magnitude summary
    #[arg(long, value_enum)]
    magnitude_by: Option<Dimension>,

    /// Dimension for shutdown rates
    #[arg(long, value_enum)]
    shutdown_by: Option<Dimension>,

    /// Dimension for layoff totals
    #[arg(long, value_enum)]
    totals_by: Option<Dimension>,

    /// Ranks kept per year (default: $LAYOFFS_TOP_N or 5)
    #[arg(long)]
    top: Option<usize>,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse { input, output } => {
            resolve_input(input).and_then(|input| cmd_parse(&input, output.as_deref()))
        }

        Commands::Clean { input, output, cleaning } => resolve_input(input)
            .and_then(|input| cmd_clean(&input, output.as_deref(), &options_from(&cleaning, None))),

        Commands::Analyze { input, output, cleaning, analysis } => resolve_input(input).and_then(|input| {
            cmd_analyze(&input, output.as_deref(), &options_from(&cleaning, Some(&analysis)))
        }),

        Commands::Run { input, out_dir, cleaning, analysis } => {
            resolve_input(input).and_then(|input| {
                let out_dir = resolve_path(out_dir, "LAYOFFS_OUT_DIR", "--out-dir")?;
                cmd_run(&input, &out_dir, &options_from(&cleaning, Some(&analysis)))
            })
        }

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Rules => cmd_rules(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn resolve_input(input: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    resolve_path(input, "LAYOFFS_INPUT", "<input>")
}

/// Flag value, else the environment variable, else an error naming both.
fn resolve_path(
    value: Option<PathBuf>,
    var: &str,
    flag: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    value
        .or_else(|| std::env::var_os(var).map(PathBuf::from))
        .ok_or_else(|| format!("missing {} (or set {})", flag, var).into())
}

/// Environment defaults overridden by command-line flags.
fn options_from(cleaning: &CleaningArgs, analysis: Option<&AnalysisArgs>) -> PipelineOptions {
    let mut options = PipelineOptions::from_env();

    if let Some(rules) = &cleaning.rules {
        options.rules_path = Some(rules.to_string_lossy().to_string());
    }
    if cleaning.skip_bad_dates {
        options.on_bad_date = DateErrorPolicy::Skip;
    }
    options.skip_validation = cleaning.no_validate;

    if let Some(analysis) = analysis {
        options.magnitude_by = analysis.magnitude_by.unwrap_or(options.magnitude_by);
        options.shutdown_by = analysis.shutdown_by.unwrap_or(options.shutdown_by);
        options.totals_by = analysis.totals_by.unwrap_or(options.totals_by);
        options.top_n = analysis.top.filter(|&n| n > 0).unwrap_or(options.top_n);
    }

    options
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> CliResult {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}' (auto-detected)", format_delimiter(result.delimiter));
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_clean(input: &Path, output: Option<&Path>, options: &PipelineOptions) -> CliResult {
    eprintln!("📄 Cleaning: {}", input.display());

    let parse_result = parse_csv_file_auto(input)?;
    if parse_result.records.is_empty() {
        return Err(layoffs::PipelineError::EmptyInput.into());
    }
    let standardizer = options.standardizer()?;
    let (records, report) = clean(stage(&parse_result), &standardizer, options.on_bad_date)?;

    eprintln!("   Rows in: {}", report.input_rows);
    eprintln!("   Duplicates removed: {}", report.duplicates.removed_count() + report.final_duplicates.removed_count());
    eprintln!("   Field changes: {}", report.standardize.changes());
    eprintln!("   Industries backfilled: {}", report.nulls.backfilled);
    eprintln!("   Rows purged: {}", report.purge.purged_count());
    eprintln!("   Rows out: {}", report.output_rows);

    match output {
        Some(path) => {
            write_csv_file(path, &records)?;
            eprintln!("💾 Output written to: {}", path.display());
        }
        None => print!("{}", layoffs::output::to_csv_string(&records)?),
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_analyze(input: &Path, output: Option<&Path>, options: &PipelineOptions) -> CliResult {
    eprintln!("📄 Processing: {}", input.display());

    let report = run_file(input, options)?;
    print_summary(&report);

    let json = serde_json::to_string_pretty(&report.analysis)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_run(input: &Path, out_dir: &Path, options: &PipelineOptions) -> CliResult {
    eprintln!("📄 Processing: {}", input.display());

    let report = run_file(input, options)?;
    print_summary(&report);

    let written = write_run(out_dir, &report)?;
    eprintln!("\n💾 Written to {}:", out_dir.display());
    for path in &written {
        eprintln!("   {}", path.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn print_summary(report: &RunReport) {
    eprintln!("   Run: {}", report.run_id);
    eprintln!("   Encoding: {}", report.source.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(report.source.delimiter));
    eprintln!("   Rows: {} in, {} cleaned", report.source.row_count, report.cleaning.output_rows);

    if let Some(stats) = &report.validation {
        eprintln!("\n✔️  Validation:");
        if stats.is_clean() {
            eprintln!("   ✅ All {} records valid!", stats.valid);
        } else {
            eprintln!("   ✅ Valid: {}", stats.valid);
            eprintln!("   ❌ Invalid: {}", stats.invalid);
            for record in stats.errors.iter().take(5) {
                eprintln!("\n   Record {}:", record.record_index);
                for err in record.errors.iter().take(3) {
                    eprintln!("     - {}", err);
                }
            }
        }
    }

    let overview = &report.analysis.overview;
    eprintln!("\n📊 {} records, {} companies", overview.records, overview.companies);
    if let (Some(first), Some(last)) = (overview.earliest_date, overview.latest_date) {
        eprintln!("   Events from {} to {}", first, last);
    }
}

fn cmd_validate(input: &Path) -> CliResult {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let records: Vec<Value> = serde_json::from_str(&content)?;
    let stats = validate_values(&records)?;

    for record in stats.errors.iter().take(5) {
        eprintln!("\n❌ Record {} invalid:", record.record_index);
        for err in record.errors.iter().take(3) {
            eprintln!("   - {}", err);
        }
    }

    eprintln!("\n📊 Results: {} valid, {} invalid", stats.valid, stats.invalid);

    if !stats.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_rules() -> CliResult {
    println!("{}", default_rules().to_json()?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
