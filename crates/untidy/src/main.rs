//! CLI entry point for the contamination pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;
use tracing::{debug, info};
use untidy::{
    ContaminationConfig, ContaminationSummary, Contaminator, MissingMarkerPolicy, OperatorFlags,
    OperatorKind,
};

/// CLI-compatible missing marker policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingMarker {
    /// Text and numeric columns may receive "?"
    TextAndNumeric,
    /// Only text columns may receive "?"
    TextOnly,
    /// Only ever inject nulls
    NullOnly,
}

impl From<CliMissingMarker> for MissingMarkerPolicy {
    fn from(cli: CliMissingMarker) -> Self {
        match cli {
            CliMissingMarker::TextAndNumeric => MissingMarkerPolicy::TextAndNumeric,
            CliMissingMarker::TextOnly => MissingMarkerPolicy::TextOnly,
            CliMissingMarker::NullOnly => MissingMarkerPolicy::NullOnly,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Inject synthetic data-quality defects into a CSV file",
    long_about = "Reads a clean CSV file, applies the enabled contamination operators at one \
                  corruption level and writes the dirty table to a new CSV file.\n\n\
                  EXAMPLES:\n  \
                  # Moderate contamination, reproducible\n  \
                  untidy -i clean.csv -o dirty.csv --level 5 --seed 42\n\n  \
                  # Only missing values and outliers\n  \
                  untidy -i clean.csv -o dirty.csv --no-text-noise --no-encoding-change \\\n      \
                  --no-numeric-to-text --no-duplicate-rows --no-duplicate-columns"
)]
struct Args {
    /// Path to the clean CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the contaminated CSV file to write
    #[arg(short, long)]
    output: PathBuf,

    /// Corruption level, from 0 (no change) to 10 (maximum)
    #[arg(short = 'L', long, default_value = "4", value_parser = clap::value_parser!(u8).range(0..=10))]
    level: u8,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Percentage of eligible cells touched at level 10
    #[arg(long, default_value = "60")]
    max_cell_percent: u8,

    /// Where the "?" marker may replace a null
    #[arg(long, value_enum, default_value = "text-and-numeric")]
    missing_marker: CliMissingMarker,

    /// Do not inject missing values
    #[arg(long)]
    no_missing_values: bool,

    /// Do not inject outliers
    #[arg(long)]
    no_outliers: bool,

    /// Do not add noise to text
    #[arg(long)]
    no_text_noise: bool,

    /// Do not cast numeric columns to text
    #[arg(long)]
    no_numeric_to_text: bool,

    /// Do not change the encoding of text columns
    #[arg(long)]
    no_encoding_change: bool,

    /// Do not duplicate rows
    #[arg(long)]
    no_duplicate_rows: bool,

    /// Do not duplicate columns
    #[arg(long)]
    no_duplicate_columns: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log every operator at info level
    #[arg(short, long)]
    verbose: bool,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Print the contamination summary as JSON instead of text
    ///
    /// Disables all logs so stdout only holds the JSON document.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn operator_flags(&self) -> OperatorFlags {
        OperatorFlags::all()
            .with(OperatorKind::MissingValues, !self.no_missing_values)
            .with(OperatorKind::Outliers, !self.no_outliers)
            .with(OperatorKind::TextNoise, !self.no_text_noise)
            .with(OperatorKind::NumericToText, !self.no_numeric_to_text)
            .with(OperatorKind::EncodingChange, !self.no_encoding_change)
            .with(OperatorKind::DuplicateRows, !self.no_duplicate_rows)
            .with(OperatorKind::DuplicateColumns, !self.no_duplicate_columns)
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let mut builder = ContaminationConfig::builder()
        .corruption_level(args.level)
        .operators(args.operator_flags())
        .max_cell_percent(args.max_cell_percent)
        .missing_marker_policy(args.missing_marker.into())
        .verbose(args.verbose);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let config = builder.build()?;

    info!("Loading dataset from: {}", args.input.display());
    let data = load_csv(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let mut contaminator = Contaminator::builder()
        .config(config)
        .on_progress(|update| debug!("[{:.0}%] {}", update.progress * 100.0, update.message))
        .build()?;
    let result = contaminator.contaminate(&data)?;

    let mut output = binary_columns_to_text(result.data)?;
    write_csv(&mut output, &args.output)?;
    info!("Contaminated dataset saved: {}", args.output.display());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.summary)?);
    } else if !args.quiet {
        print_human_readable_summary(&result.summary, &args);
    }

    Ok(())
}

/// Load a CSV file with a header row.
fn load_csv(path: &PathBuf) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.clone()))?
        .finish()?;
    Ok(df)
}

/// CSV has no byte type: render encoded columns as escaped byte strings.
fn binary_columns_to_text(mut df: DataFrame) -> Result<DataFrame> {
    let binary_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|col| col.dtype() == &DataType::Binary)
        .map(|col| col.name().to_string())
        .collect();

    for name in &binary_columns {
        let escaped: Vec<Option<String>> = df
            .column(name)?
            .as_materialized_series()
            .binary()?
            .into_iter()
            .map(|bytes| bytes.map(|b| b.escape_ascii().to_string()))
            .collect();
        df.replace(name, Series::new(name.as_str().into(), escaped))?;
    }

    Ok(df)
}

fn write_csv(df: &mut DataFrame, path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)?;
    Ok(())
}

/// Print a human-readable summary of the contamination run.
///
/// This is the default output when neither `--json` nor `--quiet` are specified.
fn print_human_readable_summary(summary: &ContaminationSummary, args: &Args) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CONTAMINATION COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input.display(),
        summary.shape_before.0,
        summary.shape_before.1
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        args.output.display(),
        summary.shape_after.0,
        summary.shape_after.1
    );
    println!();

    println!("Corruption Level: {}", summary.corruption_level);
    println!("Duration: {}ms", summary.duration_ms);
    println!();

    if !summary.actions.is_empty() {
        println!("Operators Applied:");
        for action in &summary.actions {
            let mut details = vec![format!(
                "{} {} touched",
                action.touched,
                action.operator.touched_unit()
            )];
            if action.nulls_added() > 0 {
                details.push(format!("{} nulls", action.nulls_added()));
            }
            if !action.retyped_columns.is_empty() {
                details.push(format!("retyped: {}", action.retyped_columns.join(", ")));
            }
            println!(
                "  - {} ({})",
                action.operator.display_name(),
                details.join("; ")
            );
        }
        println!();
    }

    if !summary.skipped.is_empty() {
        println!("Skipped:");
        for operator in &summary.skipped {
            println!("  - {}", operator.display_name());
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
