//! Row validation
//!
//! Turns the data rows of a [`Table`] into [`ScheduleEntry`] values. Rows that
//! cannot be displayed are dropped and recorded in the [`ValidationReport`];
//! a bad row never aborts the ingestion.

use crate::columns::Table;
use crate::dates::{is_sentinel, parse_date_cell};
use chrono::NaiveDate;
use serde::Serialize;
use sheetline_core::{Cell, ColumnRef, ScheduleConfig, ScheduleEntry, Schema};
use std::fmt;

/// Why a row was left out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Every cell of the row is empty
    BlankRow,
    MissingTask,
    MissingStart,
    MissingEnd,
    UnparsableStart,
    UnparsableEnd,
    /// Start year at or before the sentinel year (blank serial date)
    SentinelStart,
    SentinelEnd,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::BlankRow => "blank row",
            DropReason::MissingTask => "missing task",
            DropReason::MissingStart => "missing start date",
            DropReason::MissingEnd => "missing end date",
            DropReason::UnparsableStart => "unparsable start date",
            DropReason::UnparsableEnd => "unparsable end date",
            DropReason::SentinelStart => "placeholder start date",
            DropReason::SentinelEnd => "placeholder end date",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row that did not make it into the entry list
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    /// Zero-based row index in the raw grid
    pub row: usize,
    pub reason: DropReason,
}

/// Validated entries plus an account of everything left out
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Entries in source order, category unset
    pub entries: Vec<ScheduleEntry>,
    pub dropped: Vec<DroppedRow>,
    /// Data rows examined below the header
    pub rows_scanned: usize,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of dropped rows for one reason
    pub fn dropped_for(&self, reason: DropReason) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }
}

/// Validate every data row of the table
pub fn validate_rows(table: &Table<'_>, schema: &Schema, config: &ScheduleConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (row_index, row) in table.data_rows() {
        report.rows_scanned += 1;
        let ordinal = report.entries.len();

        match validate_row(row, schema, config, ordinal) {
            Ok(entry) => report.entries.push(entry.source_row(row_index)),
            Err(reason) => {
                tracing::debug!(row = row_index, %reason, "dropped row");
                report.dropped.push(DroppedRow {
                    row: row_index,
                    reason,
                });
            }
        }
    }

    tracing::info!(
        kept = report.entries.len(),
        dropped = report.dropped.len(),
        "validated rows"
    );
    report
}

fn validate_row(
    row: &[Cell],
    schema: &Schema,
    config: &ScheduleConfig,
    ordinal: usize,
) -> Result<ScheduleEntry, DropReason> {
    if row.iter().all(Cell::is_blank) {
        return Err(DropReason::BlankRow);
    }

    let task = text_at(row, &schema.task).ok_or(DropReason::MissingTask)?;

    let start = date_at(row, &schema.start, config)
        .map_err(|blank| if blank { DropReason::MissingStart } else { DropReason::UnparsableStart })?;
    let end = date_at(row, &schema.end, config)
        .map_err(|blank| if blank { DropReason::MissingEnd } else { DropReason::UnparsableEnd })?;

    if is_sentinel(start, config.date_sentinel_year) {
        return Err(DropReason::SentinelStart);
    }
    if is_sentinel(end, config.date_sentinel_year) {
        return Err(DropReason::SentinelEnd);
    }

    let wbs = schema.wbs.as_ref().and_then(|col| text_at(row, col));
    let owner = schema.owner.as_ref().and_then(|col| text_at(row, col));

    let label = match &wbs {
        Some(code) => format!("{code}{}{task}", config.label_separator),
        None => task.clone(),
    };

    let mut entry = ScheduleEntry::new(ordinal, task, start, end).label(label);
    if let Some(code) = wbs {
        entry = entry.wbs(code);
    }
    if let Some(owner) = owner {
        entry = entry.owner(owner);
    }
    Ok(entry)
}

/// Trimmed, non-empty text of a cell
fn text_at(row: &[Cell], column: &ColumnRef) -> Option<String> {
    let text = row.get(column.index)?.display_text();
    (!text.is_empty()).then_some(text)
}

/// The parsed date, or `Err(true)` for a blank cell and `Err(false)` for garbage
fn date_at(row: &[Cell], column: &ColumnRef, config: &ScheduleConfig) -> Result<NaiveDate, bool> {
    match row.get(column.index) {
        None => Err(true),
        Some(cell) if cell.is_blank() => Err(true),
        Some(cell) => parse_date_cell(cell, config.date_order).ok_or(false),
    }
}
