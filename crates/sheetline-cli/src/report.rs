//! Report formatting for CLI output
//!
//! This module turns pipeline outcomes into what the commands print:
//! - `CheckReport`: header row, resolved columns and validation summary
//! - `EntryRow`: one line of the validated entries table
//!
//! ## Exit Code Semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: at least one displayable entry |
//! | 1 | Failure: unreadable source, no header row, missing column, bad config |
//! | 2 | No displayable data: every row was filtered out |
//!
//! `--format=json` does not change exit codes.

use std::fmt::Write as _;
use std::process;

use chrono::NaiveDate;
use serde::Serialize;
use sheetline_core::{Field, ScheduleEntry};
use sheetline_engine::Outcome;
use sheetline_ingest::{DropReason, DroppedRow};

// ============================================================================
// Exit Code
// ============================================================================

/// Exit codes for CLI operations.
///
/// These are stable API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// At least one entry survived validation
    Success = 0,
    /// A fatal error was reported
    Failure = 1,
    /// Ingestion worked but nothing is displayable
    NoData = 2,
}

impl ExitCode {
    /// Exit code for a successful pipeline run
    pub fn from_outcome(outcome: &Outcome) -> Self {
        if outcome.is_empty() {
            ExitCode::NoData
        } else {
            ExitCode::Success
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get the numeric value
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code())
    }
}

// ============================================================================
// Check Report
// ============================================================================

/// Resolved column as shown by `check`
#[derive(Debug, Serialize)]
pub struct ColumnReport {
    pub field: Field,
    pub index: usize,
    pub title: String,
}

/// Summary printed by `check`
#[derive(Debug, Serialize)]
pub struct CheckReport {
    /// Zero-based header row index
    pub header_row: usize,
    pub columns: Vec<ColumnReport>,
    pub rows_scanned: usize,
    pub kept: usize,
    pub dropped: Vec<DroppedRow>,
}

impl CheckReport {
    pub fn from_outcome(outcome: &Outcome) -> Self {
        let ingestion = &outcome.ingestion;
        let columns = Field::ALL
            .into_iter()
            .filter_map(|field| {
                ingestion.schema.get(field).map(|column| ColumnReport {
                    field,
                    index: column.index,
                    title: column.title.clone(),
                })
            })
            .collect();

        Self {
            header_row: ingestion.header_row,
            columns,
            rows_scanned: ingestion.report.rows_scanned,
            kept: ingestion.report.entries.len(),
            dropped: ingestion.report.dropped.clone(),
        }
    }

    /// Human-readable form; row numbers are one-based like in a spreadsheet
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "header: row {}", self.header_row + 1);
        for column in &self.columns {
            let _ = writeln!(
                out,
                "  {:<6} <- column {} \"{}\"",
                column.field.as_str(),
                column.index + 1,
                column.title
            );
        }
        let _ = writeln!(
            out,
            "rows: {} scanned, {} kept, {} dropped",
            self.rows_scanned,
            self.kept,
            self.dropped.len()
        );

        let mut reasons: Vec<DropReason> = self.dropped.iter().map(|d| d.reason).collect();
        reasons.sort_by_key(|r| r.as_str());
        reasons.dedup();
        for reason in reasons {
            let rows: Vec<String> = self
                .dropped
                .iter()
                .filter(|d| d.reason == reason)
                .map(|d| (d.row + 1).to_string())
                .collect();
            let _ = writeln!(out, "  {}: row {}", reason, rows.join(", "));
        }
        out
    }
}

// ============================================================================
// Entries Table
// ============================================================================

/// One validated entry as printed by `entries`
#[derive(Debug, Serialize)]
pub struct EntryRow {
    pub ordinal: usize,
    /// Zero-based row index in the source grid
    pub source_row: usize,
    pub label: String,
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wbs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub category: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration_days: i64,
}

impl From<&ScheduleEntry> for EntryRow {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            ordinal: entry.ordinal,
            source_row: entry.source_row,
            label: entry.label.clone(),
            task: entry.task.clone(),
            wbs: entry.wbs.clone(),
            owner: entry.owner.clone(),
            category: entry.category.clone(),
            start: entry.start,
            end: entry.end,
            duration_days: entry.duration_days(),
        }
    }
}

pub fn entry_rows(entries: &[ScheduleEntry]) -> Vec<EntryRow> {
    entries.iter().map(EntryRow::from).collect()
}

/// Fixed-width table of entries in source order
pub fn entries_table(rows: &[EntryRow]) -> String {
    let label_width = rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0)
        .max("TASK".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<label_width$}  {:<10}  {:<10}  {:>5}  {:<12}  OWNER",
        "#", "TASK", "START", "END", "DAYS", "CATEGORY"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>4}  {:<label_width$}  {}  {}  {:>5}  {:<12}  {}",
            row.ordinal + 1,
            row.label,
            row.start.format("%Y-%m-%d"),
            row.end.format("%Y-%m-%d"),
            row.duration_days,
            row.category.as_deref().unwrap_or("-"),
            row.owner.as_deref().unwrap_or("-"),
        );
    }
    out
}
