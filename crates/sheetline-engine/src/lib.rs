//! # sheetline-engine
//!
//! Classification and timeline layout for validated schedule entries.
//!
//! This crate provides:
//! - Rule-based task classification (keywords first, WBS prefix fallback)
//! - Timeline layout: rows, tracks, phase/month/year bands, legend, milestone
//! - The end-to-end [`Pipeline`] from spreadsheet source to [`LayoutModel`]
//!
//! ## Example
//!
//! ```rust
//! use sheetline_core::{RawGrid, ScheduleConfig};
//! use sheetline_engine::Pipeline;
//!
//! let grid = RawGrid::from_text_rows(vec![
//!     vec!["WBS", "Task", "Start", "End"],
//!     vec!["2", "Design", "2025-01-01", "2025-01-15"],
//! ]);
//!
//! let pipeline = Pipeline::new(ScheduleConfig::default()).unwrap();
//! let outcome = pipeline.run_grid(&grid).unwrap();
//!
//! assert_eq!(outcome.layout.rows[0].entry.label, "2. Design");
//! assert_eq!(outcome.layout.rows[0].entry.category.as_deref(), Some("design"));
//! assert!(outcome.layout.milestone.is_some());
//! ```
//!
//! [`LayoutModel`]: sheetline_core::LayoutModel

pub mod classifier;
pub mod layout;
pub mod pipeline;

pub use classifier::{classify_entries, wbs_prefix, RuleClassifier};
pub use layout::compute_layout;
pub use pipeline::{Outcome, Pipeline, PipelineError};
