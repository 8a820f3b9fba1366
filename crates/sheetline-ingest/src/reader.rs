//! Reading source files into a headerless [`RawGrid`]
//!
//! No row is treated as a header here; header detection happens on the grid.

use crate::{IngestError, SourceFormat};
use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader};
use csv::ByteRecord;
use chrono::NaiveDate;
use sheetline_core::{Cell, RawGrid};
use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::dates::serial_to_date;

/// Options for reading a source
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    /// Worksheet to read (first sheet when unset)
    pub sheet: Option<String>,
    /// Field delimiter override for delimited text
    pub delimiter: Option<u8>,
}

impl ReadOptions {
    pub fn sheet(mut self, name: impl Into<String>) -> Self {
        self.sheet = Some(name.into());
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// Read a complete grid from in-memory file contents
pub fn read_grid(
    bytes: &[u8],
    format: SourceFormat,
    options: &ReadOptions,
) -> Result<RawGrid, IngestError> {
    match format {
        SourceFormat::Csv | SourceFormat::Tsv => {
            let delimiter = options.delimiter.unwrap_or(match format {
                SourceFormat::Tsv => b'\t',
                _ => b',',
            });
            read_delimited(bytes, delimiter)
        }
        SourceFormat::Workbook => read_workbook(Cursor::new(bytes), options.sheet.as_deref()),
    }
}

/// Read a complete grid from a rewindable source, starting at its beginning
pub fn read_grid_from<R: Read + Seek>(
    mut source: R,
    format: SourceFormat,
    options: &ReadOptions,
) -> Result<RawGrid, IngestError> {
    source.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    read_grid(&bytes, format, options)
}

fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<RawGrid, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        // Title blocks above the table are usually narrower than the table itself
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let first_record = rows.is_empty();
        let row: Vec<Cell> = record
            .iter()
            .enumerate()
            .map(|(col, field)| {
                let text = String::from_utf8_lossy(field);
                if first_record && col == 0 {
                    Cell::text(text.trim_start_matches('\u{feff}'))
                } else {
                    Cell::text(text)
                }
            })
            .collect();
        rows.push(row);
    }

    tracing::debug!(rows = rows.len(), "read delimited text");
    Ok(RawGrid::new(rows))
}

fn read_workbook<RS>(source: RS, sheet: Option<&str>) -> Result<RawGrid, IngestError>
where
    RS: Read + Seek + Clone,
{
    let mut workbook = open_workbook_auto_from_rs(source)?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(IngestError::SheetNotFound(name.to_string()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or(IngestError::NoWorksheet)??,
    };

    let grid = range_to_grid(&range);
    tracing::debug!(rows = grid.len(), sheet = ?sheet, "read workbook sheet");
    Ok(grid)
}

/// Convert a used range into a grid anchored at cell A1.
///
/// calamine trims leading empty rows and columns; they are restored so that
/// row indices match what the user sees in the spreadsheet.
fn range_to_grid(range: &Range<Data>) -> RawGrid {
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = (0..row_offset).map(|_| Vec::new()).collect();
    for source_row in range.rows() {
        let mut row = vec![Cell::Empty; col_offset as usize];
        row.extend(source_row.iter().map(convert_value));
        rows.push(row);
    }
    RawGrid::new(rows)
}

fn convert_value(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Bool(v) => Cell::Bool(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(v) => Cell::text(v.as_str()),
        Data::DateTime(v) if v.is_duration() => Cell::Number(v.as_f64()),
        Data::DateTime(v) => workbook_date(v).map_or(Cell::Empty, Cell::Date),
        Data::DateTimeIso(v) | Data::DurationIso(v) => Cell::text(v.as_str()),
    }
}

/// Date of a typed cell in the workbook's own date system (1900 or 1904)
fn workbook_date(value: &ExcelDateTime) -> Option<NaiveDate> {
    serial_to_date(value.as_f64())
        .and_then(|_| value.as_datetime())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::ExcelDateTimeType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn typed_dates_follow_the_workbook_date_system() {
        let modern = Data::DateTime(ExcelDateTime::new(45658.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(convert_value(&modern), Cell::Date(date(2025, 1, 1)));

        let mac = Data::DateTime(ExcelDateTime::new(44196.0, ExcelDateTimeType::DateTime, true));
        assert_eq!(convert_value(&mac), Cell::Date(date(2025, 1, 1)));
    }

    #[test]
    fn typed_durations_stay_numbers() {
        let duration = Data::DateTime(ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false));
        assert_eq!(convert_value(&duration), Cell::Number(1.5));
    }

    #[test]
    fn typed_dates_outside_the_serial_range_are_empty() {
        let negative = Data::DateTime(ExcelDateTime::new(-1e300, ExcelDateTimeType::DateTime, false));
        assert_eq!(convert_value(&negative), Cell::Empty);
    }

    #[test]
    fn csv_reads_every_row_without_header() {
        let input = "Project schedule\n\nWBS,Task,Start,End\n1,Kickoff,2025-01-01,2025-01-02\n";
        let grid = read_grid(input.as_bytes(), SourceFormat::Csv, &ReadOptions::default()).unwrap();

        let texts: Vec<Vec<String>> = grid
            .rows()
            .iter()
            .map(|r| r.iter().map(Cell::display_text).collect())
            .collect();
        assert!(texts.contains(&vec!["Project schedule".to_string()]));
        assert!(texts.contains(&vec![
            "WBS".to_string(),
            "Task".to_string(),
            "Start".to_string(),
            "End".to_string()
        ]));
    }

    #[test]
    fn csv_strips_byte_order_mark() {
        let input = "\u{feff}Task,Start\nA,2025-01-01\n";
        let grid = read_grid(input.as_bytes(), SourceFormat::Csv, &ReadOptions::default()).unwrap();
        assert_eq!(grid.row(0).unwrap()[0], Cell::Text("Task".into()));
    }

    #[test]
    fn csv_quoted_fields_and_blank_cells() {
        let input = "Task,Start,End\n\"Design, phase 1\",2025-01-01,\n";
        let grid = read_grid(input.as_bytes(), SourceFormat::Csv, &ReadOptions::default()).unwrap();
        let row = grid.row(1).unwrap();
        assert_eq!(row[0], Cell::Text("Design, phase 1".into()));
        assert_eq!(row[2], Cell::Empty);
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let input = "Task\tStart\nA\t2025-01-01\n";
        let grid = read_grid(input.as_bytes(), SourceFormat::Tsv, &ReadOptions::default()).unwrap();
        assert_eq!(grid.width(), 2);
    }

    #[test]
    fn delimiter_override() {
        let input = "Task;Start\nA;2025-01-01\n";
        let options = ReadOptions::default().delimiter(b';');
        let grid = read_grid(input.as_bytes(), SourceFormat::Csv, &options).unwrap();
        assert_eq!(grid.row(1).unwrap()[1], Cell::Text("2025-01-01".into()));
    }

    #[test]
    fn rewindable_source_is_read_from_start() {
        let mut cursor = Cursor::new(b"Task,Start\nA,2025-01-01\n".to_vec());
        cursor.seek(SeekFrom::End(0)).unwrap();
        let grid = read_grid_from(cursor, SourceFormat::Csv, &ReadOptions::default()).unwrap();
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn invalid_workbook_bytes_fail() {
        let result = read_grid(b"not a workbook", SourceFormat::Workbook, &ReadOptions::default());
        assert!(matches!(result, Err(IngestError::Workbook(_))));
    }

    #[test]
    fn workbook_values_convert_to_cells() {
        assert_eq!(convert_value(&Data::Empty), Cell::Empty);
        assert_eq!(convert_value(&Data::Int(2)), Cell::Number(2.0));
        assert_eq!(convert_value(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(
            convert_value(&Data::DateTimeIso("2025-01-01T00:00:00".into())),
            Cell::Text("2025-01-01T00:00:00".into())
        );
        assert_eq!(convert_value(&Data::Float(45658.0)), Cell::Number(45658.0));
    }
}
