//! Column title normalization
//!
//! Maps whatever the spreadsheet author called their columns onto the
//! canonical [`Field`]s. Fields are resolved in the order task, start, end,
//! wbs, owner; for each field the first column (in source order) whose folded
//! title contains one of the field's synonyms wins. A column claimed by an
//! earlier field is not considered again.
//!
//! When two columns both match a field, the leftmost one is used. That is a
//! deterministic policy, not a guess about which column the author meant.

use crate::IngestError;
use sheetline_core::text::fold;
use sheetline_core::{Cell, ColumnRef, ColumnSynonyms, Field, RawGrid, Schema};

/// The grid seen through its located header row
#[derive(Clone, Debug)]
pub struct Table<'g> {
    /// Index of the header row in the grid
    pub header_row: usize,
    /// Trimmed titles, one per column of the widest row
    pub titles: Vec<String>,
    grid: &'g RawGrid,
}

impl<'g> Table<'g> {
    pub fn new(grid: &'g RawGrid, header_row: usize) -> Self {
        let width = grid.width();
        let header = grid.row(header_row).unwrap_or(&[]);
        let titles = (0..width)
            .map(|col| header.get(col).map(Cell::display_text).unwrap_or_default())
            .collect();
        Self {
            header_row,
            titles,
            grid,
        }
    }

    /// Rows below the header with their grid indices
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &'g [Cell])> + 'g {
        let first = self.header_row + 1;
        self.grid
            .rows()
            .iter()
            .enumerate()
            .skip(first)
            .map(|(index, row)| (index, row.as_slice()))
    }

    pub fn row_count(&self) -> usize {
        self.grid.len().saturating_sub(self.header_row + 1)
    }
}

/// Resolve the canonical schema from column titles
pub fn normalize_columns(
    titles: &[String],
    synonyms: &ColumnSynonyms,
) -> Result<Schema, IngestError> {
    let folded_titles: Vec<String> = titles.iter().map(|t| fold(t)).collect();
    let mut claimed = vec![false; titles.len()];
    let mut resolved: [Option<ColumnRef>; 5] = Default::default();

    for (slot, field) in Field::ALL.into_iter().enumerate() {
        let candidates: Vec<String> = synonyms
            .for_field(field)
            .iter()
            .map(|s| fold(s))
            .filter(|s| !s.is_empty())
            .collect();

        let hit = folded_titles.iter().enumerate().find(|(index, title)| {
            !claimed[*index] && candidates.iter().any(|c| title.contains(c.as_str()))
        });

        if let Some((index, _)) = hit {
            claimed[index] = true;
            tracing::debug!(field = %field, column = index, title = %titles[index], "resolved column");
            resolved[slot] = Some(ColumnRef::new(index, titles[index].trim()));
        }
    }

    let [task, start, end, wbs, owner] = resolved;
    let require = |column: Option<ColumnRef>, field: Field| {
        column.ok_or_else(|| IngestError::RequiredColumnMissing {
            field,
            available: titles
                .iter()
                .filter(|t| !t.trim().is_empty())
                .cloned()
                .collect(),
        })
    };

    Ok(Schema {
        task: require(task, Field::Task)?,
        start: require(start, Field::Start)?,
        end: require(end, Field::End)?,
        wbs,
        owner,
    })
}
