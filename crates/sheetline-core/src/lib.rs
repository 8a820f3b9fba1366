//! # sheetline-core
//!
//! Core domain model and traits for the sheetline timeline pipeline.
//!
//! This crate provides:
//! - Input types: `Cell`, `RawGrid`, `Schema`
//! - Domain types: `ScheduleEntry`, `Category`, `TimeBand`, `LayoutModel`
//! - Configuration: `ScheduleConfig` and its rule tables
//! - Core traits: `Classifier`, `Renderer`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sheetline_core::ScheduleEntry;
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
//! let entry = ScheduleEntry::new(0, "Design", start, end).wbs("2");
//!
//! assert_eq!(entry.duration_days(), 14);
//! assert_eq!(entry.wbs.as_deref(), Some("2"));
//! ```

pub mod config;
pub mod text;

pub use config::{
    ClassificationRule, ColumnSynonyms, ConfigError, DateOrder, LayoutOptions, ScheduleConfig,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Identifier of a category/track
pub type CategoryId = String;

// ============================================================================
// Raw Input
// ============================================================================

/// A single untyped spreadsheet cell
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Cell the source format already typed as a date
    Date(NaiveDate),
}

impl Cell {
    /// Build a text cell; blank strings become `Empty`
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }

    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
            Cell::Bool(_) | Cell::Date(_) => false,
        }
    }

    /// Stringify the cell the way it reads in a spreadsheet.
    ///
    /// Integral numbers drop their fractional part so a WBS cell holding `2`
    /// reads as `"2"` rather than `"2.0"`.
    pub fn display_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.is_nan() => String::new(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::text(s)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<NaiveDate> for Cell {
    fn from(d: NaiveDate) -> Self {
        Cell::Date(d)
    }
}

/// Headerless rows × columns grid as read from the source file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a grid from string rows (handy for CSV-like input and tests)
    pub fn from_text_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|s| Cell::text(s.as_ref())).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row in the grid
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Canonical fields a schedule table is mapped onto
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Task,
    Start,
    End,
    Wbs,
    Owner,
}

impl Field {
    /// All fields in resolution order
    pub const ALL: [Field; 5] = [Field::Task, Field::Start, Field::End, Field::Wbs, Field::Owner];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Task => "task",
            Field::Start => "start",
            Field::End => "end",
            Field::Wbs => "wbs",
            Field::Owner => "owner",
        }
    }

    /// Ingestion fails when a required field cannot be resolved
    pub fn is_required(self) -> bool {
        matches!(self, Field::Task | Field::Start | Field::End)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source column a field was resolved from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Zero-based column index in the raw grid
    pub index: usize,
    /// Trimmed header title as it appears in the file
    pub title: String,
}

impl ColumnRef {
    pub fn new(index: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
        }
    }
}

/// Mapping from canonical fields to source columns
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub task: ColumnRef,
    pub start: ColumnRef,
    pub end: ColumnRef,
    pub wbs: Option<ColumnRef>,
    pub owner: Option<ColumnRef>,
}

impl Schema {
    pub fn get(&self, field: Field) -> Option<&ColumnRef> {
        match field {
            Field::Task => Some(&self.task),
            Field::Start => Some(&self.start),
            Field::End => Some(&self.end),
            Field::Wbs => self.wbs.as_ref(),
            Field::Owner => self.owner.as_ref(),
        }
    }
}

// ============================================================================
// Schedule Entry
// ============================================================================

/// One validated task row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Position among the validated rows, in source order
    pub ordinal: usize,
    /// Zero-based row index in the raw grid
    pub source_row: usize,
    /// Task name as written in the file
    pub task: String,
    /// Display label (`wbs + separator + task`, or the task alone)
    pub label: String,
    pub start: NaiveDate,
    /// Always after `start`
    pub end: NaiveDate,
    /// Work-breakdown code
    pub wbs: Option<String>,
    pub owner: Option<String>,
    /// Assigned by the classifier
    pub category: Option<CategoryId>,
}

impl ScheduleEntry {
    /// Create an entry whose label is the task name.
    ///
    /// Zero-length and inverted intervals are clamped to one day.
    pub fn new(ordinal: usize, task: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        let task = task.into();
        let end = if end > start {
            end
        } else {
            start.succ_opt().unwrap_or(start)
        };
        Self {
            ordinal,
            source_row: ordinal,
            label: task.clone(),
            task,
            start,
            end,
            wbs: None,
            owner: None,
            category: None,
        }
    }

    pub fn source_row(mut self, row: usize) -> Self {
        self.source_row = row;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn wbs(mut self, code: impl Into<String>) -> Self {
        self.wbs = Some(code.into());
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Length of the bar in days (at least one)
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }
}

// ============================================================================
// Categories
// ============================================================================

/// A display track tasks are grouped into
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Legend/display name
    pub name: String,
    /// Color token handed to the renderer
    pub color: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

// ============================================================================
// Layout Model
// ============================================================================

/// Inclusive project date range `[start, end]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Kind of calendar band
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandKind {
    Phase,
    Month,
    Year,
}

/// A labeled half-open interval `[start, end)` on the date axis
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBand {
    pub kind: BandKind,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeBand {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// An entry placed on a row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowPlacement {
    pub entry: ScheduleEntry,
    pub row_index: usize,
    /// Position of the track this row belongs to, in display order
    pub track_index: usize,
    /// Top of the row in row units (grows downward)
    pub y: f64,
}

/// Vertical extent of one non-empty category track
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSpan {
    pub category: CategoryId,
    pub name: String,
    pub color: String,
    pub first_row: usize,
    pub last_row: usize,
    pub y_top: f64,
    pub y_bottom: f64,
}

/// Legend entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegendSwatch {
    pub category: CategoryId,
    pub name: String,
    pub color: String,
    /// Left-to-right slot
    pub slot: usize,
    /// Horizontal position as a fraction of the axis width
    pub x: f64,
    /// Vertical position in row units (negative = above row 0)
    pub y: f64,
}

/// Project completion marker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub date: NaiveDate,
    pub label: String,
    /// Bottom of the last row, in row units
    pub y: f64,
}

/// The renderer-agnostic output of the pipeline
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutModel {
    /// Rows in display order
    pub rows: Vec<RowPlacement>,
    pub tracks: Vec<TrackSpan>,
    /// Phase, month and year bands, each kind in date order
    pub bands: Vec<TimeBand>,
    pub legend: Vec<LegendSwatch>,
    pub milestone: Option<Milestone>,
    /// `[min start, max end]` across all entries
    pub date_range: Option<DateRange>,
    /// Total height of the row area in row units
    pub height: f64,
}

impl LayoutModel {
    /// True when there is nothing to display
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bands of a single kind, in date order
    pub fn bands_of(&self, kind: BandKind) -> impl Iterator<Item = &TimeBand> {
        self.bands.iter().filter(move |b| b.kind == kind)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Assigns a category to a validated entry.
///
/// Implementations must be total: every entry receives exactly one category.
pub trait Classifier: Send + Sync {
    fn classify(&self, entry: &ScheduleEntry) -> CategoryId;
}

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a layout to the output format
    fn render(&self, layout: &LayoutModel) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
