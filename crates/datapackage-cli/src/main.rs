mod config;
mod discover;
mod logging;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use datapackage_core::{
    DEFAULT_MAX_DEPTH, DataPackageSchema, Error as CoreError, ReasonMode, RequirementValidator,
    ValidationResult, validate_package_schema,
};
use datapackage_source::{FileSource, SourceError, TextFileSource};
use serde::Serialize;
use thiserror::Error;

use config::{LogFormat, load_schema, load_settings};
use discover::{discover_sources, presence_from};
use logging::init_logging;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "datapackage", version, about = "Data package table validation")]
struct Cli {
    /// Optional TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log record format (overrides the settings file).
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
    /// Enable debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check which tables are present against the package requirements.
    Validate(ValidateArgs),
    /// Count rows, columns and empty lines of a delimited text file.
    Analyze(AnalyzeArgs),
    /// Check the package schema document for internal consistency.
    CheckSchema(CheckSchemaArgs),
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Package schema document (JSON, or TOML by extension).
    #[arg(long)]
    schema: PathBuf,
    /// Directory whose table files determine the present tables.
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Table name to treat as present (repeatable).
    #[arg(long = "table", value_name = "NAME")]
    tables: Vec<String>,
    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Report every failing allOf branch instead of the last one.
    #[arg(long, default_value_t = false)]
    collect_all: bool,
    /// Maximum requirement tree depth.
    #[arg(long)]
    max_depth: Option<usize>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// File to analyze.
    file: PathBuf,
    /// Field delimiter, escaped form accepted (e.g. `\t`).
    #[arg(long, default_value = "\\t")]
    delimiter: String,
    /// Quote character enclosing fields.
    #[arg(long)]
    quote: Option<String>,
    /// Number of header lines to skip.
    #[arg(long, default_value_t = 0)]
    header_lines: usize,
}

#[derive(Args, Debug)]
struct CheckSchemaArgs {
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct ValidationOutput<'a> {
    schema: &'a str,
    tables: &'a BTreeSet<String>,
    #[serde(flatten)]
    result: &'a ValidationResult,
}

#[derive(Debug, Serialize)]
struct AnalysisOutput {
    name: String,
    columns: Vec<String>,
    rows: usize,
    column_count: usize,
    file_size: u64,
    empty_lines: BTreeSet<usize>,
}

fn main() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    init_logging(cli.log_format.unwrap_or(settings.log_format), cli.verbose)?;

    match cli.command {
        Command::Validate(args) => run_validate(args, &settings),
        Command::Analyze(args) => run_analyze(args),
        Command::CheckSchema(args) => run_check_schema(args),
    }
}

fn run_validate(args: ValidateArgs, settings: &config::CliSettings) -> Result<ExitCode, CliError> {
    let schema = load_checked_schema(&args.schema)?;
    tracing::info!(event = "schema_loaded", schema = %schema.identifier);

    let sources = match args.dir.as_ref().or(settings.data_dir.as_ref()) {
        Some(dir) => discover_sources(dir, &schema)?,
        None => Vec::new(),
    };
    let presence = presence_from(&sources, &args.tables);

    let reason_mode = if args.collect_all {
        ReasonMode::CollectAll
    } else {
        settings.reasons.into()
    };
    let max_depth = args
        .max_depth
        .or(settings.max_depth)
        .unwrap_or(DEFAULT_MAX_DEPTH);

    let result = RequirementValidator::new()
        .with_max_depth(max_depth)
        .with_reason_mode(reason_mode)
        .validate(&presence, &schema.table_schemas_requirements)?;

    tracing::info!(
        event = "package_validated",
        schema = %schema.identifier,
        tables = presence.len(),
        valid = result.is_valid()
    );

    let report = build_report(args.format, &schema.identifier, &presence, &result)?;
    println!("{}", report.output);

    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Load a schema document and reject it unless it is internally consistent.
fn load_checked_schema(path: &Path) -> Result<DataPackageSchema, CliError> {
    let schema = load_schema(path)?;
    validate_package_schema(&schema)?;
    Ok(schema)
}

/// Rendered verdict plus whether the command should exit successfully.
#[derive(Debug)]
struct ValidationReport {
    output: String,
    success: bool,
}

fn build_report(
    format: OutputFormat,
    schema: &str,
    presence: &BTreeSet<String>,
    result: &ValidationResult,
) -> Result<ValidationReport, CliError> {
    let output = match format {
        OutputFormat::Text => {
            let tables: Vec<&str> = presence.iter().map(String::as_str).collect();
            format!("tables: {}\n{result}", tables.join(", "))
        }
        OutputFormat::Json => serde_json::to_string_pretty(&ValidationOutput {
            schema,
            tables: presence,
            result,
        })?,
    };

    Ok(ValidationReport {
        output,
        success: result.is_valid(),
    })
}

fn run_analyze(args: AnalyzeArgs) -> Result<ExitCode, CliError> {
    let mut source = TextFileSource::from_path(&args.file);
    source.set_fields_terminated_by_escaped(&args.delimiter);
    source.set_fields_enclosed_by_escaped(args.quote.as_deref());
    source.set_ignore_header_lines(Some(args.header_lines));

    let empty_lines = source.analyze()?;
    let output = AnalysisOutput {
        columns: source.columns()?,
        name: source.name.clone(),
        rows: source.rows(),
        column_count: source.column_count(),
        file_size: source.file_size(),
        empty_lines,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(ExitCode::SUCCESS)
}

fn run_check_schema(args: CheckSchemaArgs) -> Result<ExitCode, CliError> {
    let schema = load_checked_schema(&args.schema)?;
    println!(
        "schema {} is consistent ({} table schemas)",
        schema.identifier,
        schema.table_schemas.len()
    );
    Ok(ExitCode::SUCCESS)
}
