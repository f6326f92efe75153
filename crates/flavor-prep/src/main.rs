//! CLI entry point for the flavor data preparation pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use flavor_prep::{
    Pipeline, PipelineConfig, PrepSummary, REPLACEMENT_RULES, UnknownTokenPolicy,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible unknown-token policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliUnknownTokenPolicy {
    /// Silently omit tokens absent from the vocabulary
    Drop,
    /// Count and report omitted tokens without failing
    Report,
}

impl From<CliUnknownTokenPolicy> for UnknownTokenPolicy {
    fn from(cli: CliUnknownTokenPolicy) -> Self {
        match cli {
            CliUnknownTokenPolicy::Drop => UnknownTokenPolicy::Drop,
            CliUnknownTokenPolicy::Report => UnknownTokenPolicy::Report,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Flavor Data Preparation Pipeline",
    long_about = "Prepares the merged recipe/dessert dataset for the flavor-pairing\n\
                  recommender: selects the required columns, normalizes the flavor\n\
                  text, extracts the flavor vocabulary, and one-hot encodes the\n\
                  flavors.\n\n\
                  EXAMPLES:\n  \
                  # Run the full pipeline\n  \
                  flavor-prep -i data/merged.csv -o data/pipeline\n\n  \
                  # Preview the run without writing anything\n  \
                  flavor-prep -i data/merged.csv --dry-run\n\n  \
                  # Report unknown tokens instead of dropping them silently\n  \
                  flavor-prep -i data/merged.csv --unknown-tokens report"
)]
struct Args {
    /// Path to the merged CSV file to process
    #[arg(short, long)]
    input: String,

    /// Output directory for the generated artifacts
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Required column names, in output order (comma-separated)
    ///
    /// Rows with a missing value in any of them are removed; a name absent
    /// from the input aborts the run
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "recipe_name,aggregateRating,flavors,willMakeAgainPct,reviewsCount,url"
    )]
    required_columns: Vec<String>,

    /// Name of the free-text flavor column
    #[arg(long, default_value = "flavors")]
    flavor_column: String,

    /// How to treat record tokens absent from the vocabulary
    #[arg(long, value_enum, default_value = "drop")]
    unknown_tokens: CliUnknownTokenPolicy,

    /// Preview what the pipeline will do without processing
    ///
    /// Shows the schema check result, per-column null counts, the
    /// replacement rules, and the artifacts a real run would write
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Output the run summary as JSON on stdout instead of the
    /// human-readable report
    ///
    /// Disables all progress logs; only the JSON summary is written.
    #[arg(long)]
    json: bool,
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

    if !std::path::Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading merged dataset from: {}", args.input);
    let data = load_csv(&args.input)?;
    info!("Dataset loaded: {:?}", data.shape());

    if args.dry_run {
        return run_dry_run(&args, &data);
    }

    let config = PipelineConfig::builder()
        .required_columns(args.required_columns.clone())
        .flavor_column(&args.flavor_column)
        .output_dir(&args.output)
        .unknown_token_policy(args.unknown_tokens.into())
        .build()?;

    let pipeline = Pipeline::builder().config(config).build()?;

    match pipeline.process(data) {
        Ok(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result.summary)?);
            } else {
                print_summary(&args, &result.summary);
            }
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            if e.is_schema_violation() {
                error!(
                    "Check that the required columns exist in the raw data: {:?}",
                    args.required_columns
                );
            }
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
}

/// Load the merged CSV, tolerating quoted fields.
fn load_csv(path: &str) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .map_err(|e| anyhow!("Failed to read {}: {}", path, e))
}

/// Dry-run mode: show what would happen without processing.
///
/// Uses `println!` intentionally; this output is the purpose of --dry-run
/// and should be visible regardless of log level.
fn run_dry_run(args: &Args, data: &DataFrame) -> Result<()> {
    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of preparation actions");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", data.height());
    println!("  Columns: {}", data.width());
    println!();

    println!("SCHEMA CHECK");
    println!("{}", "-".repeat(40));

    let present: Vec<String> = data
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    let missing: Vec<&String> = args
        .required_columns
        .iter()
        .filter(|name| !present.contains(name))
        .collect();

    if missing.is_empty() {
        println!("  All {} required columns present", args.required_columns.len());
        for name in &args.required_columns {
            let nulls = data.column(name).map(|c| c.null_count()).unwrap_or(0);
            println!("  {:<20} {} missing values", name, nulls);
        }
    } else {
        println!("  MISSING required columns: {:?}", missing);
        println!("  A real run would abort with a schema-mismatch error.");
    }
    println!();

    println!("REPLACEMENT RULES (applied in order)");
    println!("{}", "-".repeat(40));
    for (i, (pattern, replacement)) in REPLACEMENT_RULES.iter().enumerate() {
        println!("  {}. {} -> {}", i + 1, pattern, replacement);
    }
    println!();

    println!("OUTPUT FILES (will be created)");
    println!("{}", "-".repeat(40));
    println!("  - {}/clean.csv", args.output);
    println!("  - {}/flavors.json", args.output);
    println!("  - {}/final.csv", args.output);
    println!();

    println!("{}", "=".repeat(80));
    println!("To execute the preparation, run without --dry-run");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Print a human-readable summary of the run (default output mode).
fn print_summary(args: &Args, summary: &PrepSummary) {
    println!();
    println!("{}", "=".repeat(80));
    println!("PREPARATION COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input, summary.rows_before, summary.columns_before
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        args.output, summary.rows_after, summary.columns_after
    );
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed for missing required values)",
        summary.rows_before, summary.rows_after, summary.rows_dropped
    );
    println!("  Flavor vocabulary: {} tokens", summary.vocabulary_size);
    if summary.unknown_token_count > 0 {
        println!(
            "  Unknown tokens dropped: {} occurrences of {:?}",
            summary.unknown_token_count, summary.unknown_tokens
        );
    }
    println!();

    if !summary.artifacts_written.is_empty() {
        println!("Artifacts:");
        for path in &summary.artifacts_written {
            println!("  - {}", path.display());
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
