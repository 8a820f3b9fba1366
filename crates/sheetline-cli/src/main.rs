//! sheetline CLI - spreadsheet schedules to timeline layouts
//!
//! Command-line interface for checking schedule files, listing validated
//! entries and computing timeline layouts.

mod render;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sheetline_core::{Renderer, ScheduleConfig};
use sheetline_engine::{Outcome, Pipeline};
use sheetline_ingest::{detect_format, ReadOptions, SourceFormat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::render::{JsonRenderer, TextRenderer};
use crate::report::{entries_table, entry_rows, CheckReport, ExitCode};

#[derive(Parser)]
#[command(name = "sheetline")]
#[command(author, version, about = "Spreadsheet schedules to timeline layouts", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "SHEETLINE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the header, resolve columns and report dropped rows
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List validated, classified entries
    Entries {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute the timeline layout
    Layout {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Input file path
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Worksheet to read (first sheet if not specified)
    #[arg(long)]
    sheet: Option<String>,

    /// Input format (csv, tsv, xlsx, ...); detected from the extension by default
    #[arg(long, value_parser = parse_source_format)]
    input_format: Option<SourceFormat>,

    /// Field delimiter for delimited text
    #[arg(long)]
    delimiter: Option<char>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_source_format(s: &str) -> Result<SourceFormat, String> {
    s.parse()
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match run(cli) {
        Ok(code) => code.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::Failure.into()
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Check { source, format }) => {
            let outcome = run_pipeline(&source, config)?;
            let report = CheckReport::from_outcome(&outcome);
            let text = match format {
                OutputFormat::Text => report.to_text(),
                OutputFormat::Json => to_json(&report)?,
            };
            write_output(None, &text)?;
            Ok(finish(&outcome))
        }
        Some(Commands::Entries {
            source,
            format,
            output,
        }) => {
            let outcome = run_pipeline(&source, config)?;
            let code = finish(&outcome);
            if code.is_success() {
                let rows = entry_rows(&outcome.ingestion.report.entries);
                let text = match format {
                    OutputFormat::Text => entries_table(&rows),
                    OutputFormat::Json => to_json(&rows)?,
                };
                write_output(output.as_deref(), &text)?;
            }
            Ok(code)
        }
        Some(Commands::Layout {
            source,
            format,
            compact,
            output,
        }) => {
            let outcome = run_pipeline(&source, config)?;
            let code = finish(&outcome);
            if code.is_success() {
                let text = match format {
                    OutputFormat::Text => TextRenderer.render(&outcome.layout)?,
                    OutputFormat::Json => {
                        let mut json = JsonRenderer { compact }.render(&outcome.layout)?;
                        json.push('\n');
                        json
                    }
                };
                write_output(output.as_deref(), &text)?;
            }
            Ok(code)
        }
        Some(Commands::Config) => {
            write_output(None, &config.to_toml_string()?)?;
            Ok(ExitCode::Success)
        }
        None => {
            println!("sheetline - spreadsheet schedules to timeline layouts");
            println!("Run with --help for usage information");
            Ok(ExitCode::Success)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ScheduleConfig> {
    let Some(path) = path else {
        return Ok(ScheduleConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let config = ScheduleConfig::from_toml_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

fn run_pipeline(source: &SourceArgs, config: ScheduleConfig) -> Result<Outcome> {
    let pipeline = Pipeline::new(config)?;
    let format = source
        .input_format
        .unwrap_or_else(|| detect_format(&source.file));

    let mut options = ReadOptions::default();
    if let Some(sheet) = &source.sheet {
        options = options.sheet(sheet.clone());
    }
    if let Some(delimiter) = source.delimiter {
        let byte = u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| format!("delimiter must be a single ASCII character, got {delimiter:?}"))?;
        options = options.delimiter(byte);
    }

    let bytes = std::fs::read(&source.file)
        .with_context(|| format!("cannot read {}", source.file.display()))?;
    tracing::info!(file = %source.file.display(), ?format, "ingesting");

    pipeline
        .run_bytes(&bytes, format, &options)
        .with_context(|| format!("cannot ingest {}", source.file.display()))
}

/// Report an empty dataset and pick the exit code
fn finish(outcome: &Outcome) -> ExitCode {
    for warning in outcome.warnings() {
        eprintln!("warning: {warning}");
    }
    ExitCode::from_outcome(outcome)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("cannot write {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
