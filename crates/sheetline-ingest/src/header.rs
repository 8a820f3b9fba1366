//! Header row detection
//!
//! Schedules exported from spreadsheets often carry title blocks, logos or
//! notes above the actual table. The header row is the first row that names
//! both a task column and a start column. There is no scoring: the scan is
//! top to bottom and the first qualifying row wins.
//!
//! A cell names a column when a token occurs in it as whole words or when the
//! cell begins with the token (`TaskName`, `StartDate`). A token buried inside
//! a word (`Multitasking`, `Restart`) does not count, which keeps title blocks
//! from passing as headers. Column resolution below the header is looser and
//! matches synonyms anywhere in the title.

use crate::IngestError;
use sheetline_core::text::{words, Phrase};
use sheetline_core::{Cell, ColumnSynonyms, RawGrid};

/// Tokens that identify a header row
#[derive(Clone, Debug)]
pub struct HeaderTokens {
    task: Vec<Phrase>,
    start: Vec<Phrase>,
}

impl HeaderTokens {
    pub fn new(task: &[String], start: &[String]) -> Self {
        let phrases = |list: &[String]| -> Vec<Phrase> {
            list.iter()
                .map(|s| Phrase::new(s))
                .filter(|p| !p.is_empty())
                .collect()
        };
        Self {
            task: phrases(task),
            start: phrases(start),
        }
    }

    /// Reuse the task and start column synonyms as header tokens
    pub fn from_synonyms(columns: &ColumnSynonyms) -> Self {
        Self::new(&columns.task, &columns.start)
    }

    /// A row qualifies when one cell names the task column and a different
    /// cell names the start column
    pub fn matches_row(&self, row: &[Cell]) -> bool {
        let mut task_cells = Vec::new();
        let mut start_cells = Vec::new();

        for (col, cell) in row.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            let cell_words = words(&cell.display_text());
            let names = |tokens: &[Phrase]| {
                tokens
                    .iter()
                    .any(|p| p.occurs_in(&cell_words) || p.leads(&cell_words))
            };
            if names(&self.task) {
                task_cells.push(col);
            }
            if names(&self.start) {
                start_cells.push(col);
            }
        }

        task_cells
            .iter()
            .any(|t| start_cells.iter().any(|s| s != t))
    }
}

/// Find the zero-based index of the header row.
///
/// At most `scan_limit` rows are examined when a limit is given.
pub fn locate_header(
    grid: &RawGrid,
    tokens: &HeaderTokens,
    scan_limit: Option<usize>,
) -> Result<usize, IngestError> {
    let limit = scan_limit.unwrap_or(usize::MAX).min(grid.len());

    for (index, row) in grid.rows().iter().take(limit).enumerate() {
        if tokens.matches_row(row) {
            tracing::info!(row = index, "located header row");
            return Ok(index);
        }
    }

    Err(IngestError::HeaderNotFound { scanned: limit })
}
