//! # sheetline-ingest
//!
//! Turns a spreadsheet export into validated schedule entries.
//!
//! This crate provides:
//! - Grid reading for delimited text (`csv`) and workbooks (`calamine`)
//! - Header row detection
//! - Column title normalization onto canonical fields
//! - Row validation with a permissive date parser
//!
//! ## Example
//!
//! ```rust
//! use sheetline_core::ScheduleConfig;
//! use sheetline_ingest::{ingest_bytes, ReadOptions, SourceFormat};
//!
//! let input = "Master schedule\n\
//!              WBS,Task,Start,End\n\
//!              1,Kickoff,,\n\
//!              2,Design,2025-01-01,2025-01-15\n";
//!
//! let ingestion = ingest_bytes(
//!     input.as_bytes(),
//!     SourceFormat::Csv,
//!     &ReadOptions::default(),
//!     &ScheduleConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(ingestion.header_row, 1);
//! assert_eq!(ingestion.report.entries.len(), 1);
//! assert_eq!(ingestion.report.entries[0].label, "2. Design");
//! ```

pub mod columns;
pub mod dates;
pub mod header;
pub mod reader;
pub mod validate;

pub use columns::{normalize_columns, Table};
pub use header::{locate_header, HeaderTokens};
pub use reader::{read_grid, read_grid_from, ReadOptions};
pub use validate::{validate_rows, DropReason, DroppedRow, ValidationReport};

use sheetline_core::{Field, RawGrid, ScheduleConfig, Schema};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No header row naming both a task and a start column in the first {scanned} rows")]
    HeaderNotFound { scanned: usize },

    #[error("Required column '{field}' not found (columns: {})", .available.join(", "))]
    RequiredColumnMissing { field: Field, available: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    #[error("Workbook contains no worksheet")]
    NoWorksheet,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal conditions reported alongside a successful ingestion
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestWarning {
    /// Every data row was filtered out
    EmptyDataset { rows_scanned: usize },
}

impl fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestWarning::EmptyDataset { rows_scanned } => write!(
                f,
                "no displayable data: all {rows_scanned} data rows were filtered out"
            ),
        }
    }
}

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-delimited text (.csv, .txt)
    Csv,
    /// Tab-delimited text (.tsv)
    Tsv,
    /// Spreadsheet workbook (.xlsx, .xlsm, .xlsb, .xls, .ods)
    Workbook,
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Ok(SourceFormat::Csv),
            "tsv" | "tab" => Ok(SourceFormat::Tsv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" | "workbook" => Ok(SourceFormat::Workbook),
            other => Err(format!("unknown input format: {other}")),
        }
    }
}

/// Detect source format from extension
pub fn detect_format(path: &Path) -> SourceFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|e| e.parse().ok())
        .unwrap_or(SourceFormat::Workbook)
}

/// Result of ingesting one source
#[derive(Clone, Debug, PartialEq)]
pub struct Ingestion {
    /// Zero-based header row index in the raw grid
    pub header_row: usize,
    pub schema: Schema,
    pub report: ValidationReport,
}

impl Ingestion {
    pub fn warnings(&self) -> Vec<IngestWarning> {
        if self.report.is_empty() {
            vec![IngestWarning::EmptyDataset {
                rows_scanned: self.report.rows_scanned,
            }]
        } else {
            Vec::new()
        }
    }
}

/// Locate the header, resolve columns and validate rows of an in-memory grid
pub fn ingest_grid(grid: &RawGrid, config: &ScheduleConfig) -> Result<Ingestion, IngestError> {
    let tokens = HeaderTokens::from_synonyms(&config.columns);
    let header_row = locate_header(grid, &tokens, config.header_scan_limit)?;

    let table = Table::new(grid, header_row);
    let schema = normalize_columns(&table.titles, &config.columns)?;
    let report = validate_rows(&table, &schema, config);

    Ok(Ingestion {
        header_row,
        schema,
        report,
    })
}

/// Ingest file contents
pub fn ingest_bytes(
    bytes: &[u8],
    format: SourceFormat,
    options: &ReadOptions,
    config: &ScheduleConfig,
) -> Result<Ingestion, IngestError> {
    let grid = read_grid(bytes, format, options)?;
    ingest_grid(&grid, config)
}

/// Ingest a file, detecting its format from the extension
pub fn ingest_path(
    path: &Path,
    options: &ReadOptions,
    config: &ScheduleConfig,
) -> Result<Ingestion, IngestError> {
    let bytes = std::fs::read(path)?;
    ingest_bytes(&bytes, detect_format(path), options, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format_csv() {
        assert_eq!(detect_format(Path::new("plan.csv")), SourceFormat::Csv);
        assert_eq!(detect_format(Path::new("plan.CSV")), SourceFormat::Csv);
        assert_eq!(detect_format(Path::new("plan.txt")), SourceFormat::Csv);
    }

    #[test]
    fn test_detect_format_tsv() {
        assert_eq!(detect_format(Path::new("plan.tsv")), SourceFormat::Tsv);
    }

    #[test]
    fn test_detect_format_workbook() {
        for name in ["plan.xlsx", "plan.xlsm", "plan.xlsb", "plan.xls", "plan.ods"] {
            assert_eq!(detect_format(Path::new(name)), SourceFormat::Workbook, "{name}");
        }
    }

    #[test]
    fn test_detect_format_unknown() {
        assert_eq!(detect_format(Path::new("plan.bin")), SourceFormat::Workbook);
        assert_eq!(detect_format(Path::new("plan")), SourceFormat::Workbook);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("CSV".parse::<SourceFormat>(), Ok(SourceFormat::Csv));
        assert_eq!("workbook".parse::<SourceFormat>(), Ok(SourceFormat::Workbook));
        assert!("pdf".parse::<SourceFormat>().is_err());
    }

    #[test]
    fn test_ingest_path_not_found() {
        let result = ingest_path(
            Path::new("/nonexistent/path/to/plan.csv"),
            &ReadOptions::default(),
            &ScheduleConfig::default(),
        );
        assert!(matches!(result, Err(IngestError::Io(_))));
    }

    #[test]
    fn test_ingest_path_csv() {
        use std::io::Write;
        let mut temp_file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(temp_file, "Task,Start,End").unwrap();
        writeln!(temp_file, "Design,2025-01-01,2025-01-15").unwrap();

        let ingestion =
            ingest_path(temp_file.path(), &ReadOptions::default(), &ScheduleConfig::default())
                .unwrap();
        assert_eq!(ingestion.header_row, 0);
        assert_eq!(ingestion.report.entries.len(), 1);
        assert!(ingestion.warnings().is_empty());
    }

    #[test]
    fn test_empty_dataset_is_a_warning() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["Task", "Start", "End"],
            vec!["Kickoff", "1899-12-30", "1899-12-30"],
        ]);
        let ingestion = ingest_grid(&grid, &ScheduleConfig::default()).unwrap();
        assert_eq!(
            ingestion.warnings(),
            vec![IngestWarning::EmptyDataset { rows_scanned: 1 }]
        );
        assert!(ingestion.warnings()[0].to_string().contains("no displayable data"));
    }

    #[test]
    fn test_missing_end_column_is_fatal() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["Task", "Start", "Owner"],
            vec!["Kickoff", "2025-01-01", "Lan"],
        ]);
        let err = ingest_grid(&grid, &ScheduleConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::RequiredColumnMissing { field: Field::End, .. }
        ));
    }
}
