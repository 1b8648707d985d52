use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use docstruct::{
    CellTable, ExportFormat, LabelSelection, Prediction, PredictionSplitter, RowClusterOptions,
    RowReport, Token, cluster_line_items, split_predictions, write_csv, write_csv_to_string,
};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "docstruct",
    version,
    about = "Rebuild table rows and merged-cell tables from predictions and OCR tokens"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Tag line-item predictions with the table row they sit on.
    Rows(RowsArgs),
    /// Export a sparse cell map as CSV, HTML or XLSX.
    Table(TableArgs),
    /// Split multi-line predictions into one prediction per line.
    Split(SplitArgs),
}

#[derive(Debug, Args)]
struct RowsArgs {
    /// JSON array of predictions.
    #[arg(short, long)]
    predictions: PathBuf,

    /// JSON array of OCR tokens for the same document.
    #[arg(short, long)]
    tokens: PathBuf,

    /// Line-item labels, comma separated.
    #[arg(short, long)]
    labels: String,

    /// Annotate predictions without a matching token instead of failing.
    #[arg(long)]
    lenient: bool,

    /// Minimum vertical overlap (fraction of the shorter box) to share a row.
    #[arg(long, default_value_t = 0.5)]
    min_overlap: f64,

    /// Output JSON path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write one CSV record per row.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct TableArgs {
    /// JSON object mapping cell ids to cells.
    #[arg(short, long)]
    cells: PathBuf,

    /// Export format: csv, html or xlsx.
    #[arg(short, long, default_value = "csv")]
    format: String,

    /// Output path; stdout when omitted (not available for xlsx).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// CSV delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,
}

#[derive(Debug, Args)]
struct SplitArgs {
    /// JSON prediction object or array of predictions.
    #[arg(short, long)]
    predictions: PathBuf,

    /// Separator regex; defaults to newlines with surrounding whitespace.
    #[arg(long)]
    pattern: Option<String>,

    /// Output JSON path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse '{}'", path.display()))
}

fn emit(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("failed to write '{}'", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

fn log_report(report: &RowReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} label={:?} row={:?} index={:?}: {}",
                warning.code,
                warning.label,
                warning.row_number,
                warning.prediction_index,
                warning.message
            );
        }
    }
}

fn run_rows(args: &RowsArgs) -> Result<RowReport> {
    let labels = LabelSelection::from_str(&args.labels)
        .map_err(|error| anyhow!("invalid label selection: {error}"))
        .context("failed to parse --labels")?;
    let predictions: Vec<Prediction> = read_json(&args.predictions)?;
    let tokens: Vec<Token> = read_json(&args.tokens)?;

    let options = RowClusterOptions {
        min_vertical_overlap: args.min_overlap,
    };
    let (items, report) = cluster_line_items(
        predictions,
        &tokens,
        labels.into_labels(),
        options,
        !args.lenient,
    )
    .with_context(|| format!("failed to assign rows for '{}'", args.predictions.display()))?;

    if let Some(path) = &args.csv {
        write_csv(path, &items.row_table(), b',')
            .with_context(|| format!("failed to write '{}'", path.display()))?;
    }

    let json = serde_json::to_string_pretty(items.updated_predictions())?;
    emit(args.output.as_deref(), &json)?;
    Ok(report)
}

fn run_table(args: &TableArgs) -> Result<()> {
    let format = ExportFormat::from_str(&args.format).map_err(|error| anyhow!(error))?;
    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }
    let cells: CellTable = read_json(&args.cells)?;

    match format {
        ExportFormat::Csv => {
            let csv = write_csv_to_string(&cells.to_tabular()?, args.delimiter as u8)?;
            emit(args.output.as_deref(), csv.trim_end())
        }
        ExportFormat::Html => emit(args.output.as_deref(), &cells.to_markup()?),
        ExportFormat::Xlsx => {
            let path = args
                .output
                .as_deref()
                .ok_or_else(|| anyhow!("--output is required for xlsx export"))?;
            cells
                .to_spreadsheet(path)
                .with_context(|| format!("failed to write '{}'", path.display()))
        }
    }
}

fn run_split(args: &SplitArgs) -> Result<()> {
    let splitter = match args.pattern.as_deref() {
        Some(pattern) => PredictionSplitter::new(pattern).context("failed to parse --pattern")?,
        None => PredictionSplitter::default(),
    };

    let value: serde_json::Value = read_json(&args.predictions)?;
    let predictions: Vec<Prediction> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };

    let pieces = split_predictions(&predictions, &splitter)
        .with_context(|| format!("failed to split '{}'", args.predictions.display()))?;
    emit(args.output.as_deref(), &serde_json::to_string_pretty(&pieces)?)
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docstruct=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Rows(args) => run_rows(&args).map(|report| {
            log_report(&report, args.verbose);
            if report.row_count > 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }),
        Commands::Table(args) => run_table(&args).map(|()| ExitCode::SUCCESS),
        Commands::Split(args) => run_split(&args).map(|()| ExitCode::SUCCESS),
    };

    outcome.unwrap_or_else(|error| {
        eprintln!("error: {error:#}");
        ExitCode::from(1)
    })
}
