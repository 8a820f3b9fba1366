//! Pipeline configuration
//!
//! Every rule table the pipeline evaluates (column synonyms, classification
//! keywords, WBS prefix fallback, phase names) is data carried by
//! [`ScheduleConfig`], so one engine serves any schedule taxonomy.
//!
//! Configuration is usually loaded from TOML. Every field has a default, so
//! a file only needs the keys it changes:
//!
//! ```rust
//! use sheetline_core::ScheduleConfig;
//!
//! let config = ScheduleConfig::from_toml_str(r#"
//!     date_sentinel_year = 1950
//!     phases = ["Discovery", "Build", "Launch"]
//! "#).unwrap();
//!
//! assert_eq!(config.date_sentinel_year, 1950);
//! assert_eq!(config.phases.len(), 3);
//! assert_eq!(config.default_category, "other");
//! ```

use crate::{Category, CategoryId, Field};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("At least one phase must be configured")]
    NoPhases,

    #[error("At least one category must be configured")]
    NoCategories,

    #[error("Duplicate category id: {0}")]
    DuplicateCategory(CategoryId),

    #[error("Unknown category '{category}' referenced by {context}")]
    UnknownCategory { category: CategoryId, context: String },

    #[error("No synonyms configured for required column '{0}'")]
    EmptySynonyms(Field),

    #[error("Invalid layout option: {0}")]
    InvalidLayout(String),
}

// ============================================================================
// Date Order
// ============================================================================

/// Preferred reading of ambiguous numeric dates like `01/02/2025`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateOrder {
    /// Month / day / year
    #[default]
    Mdy,
    /// Day / month / year
    Dmy,
    /// Year / month / day
    Ymd,
}

// ============================================================================
// Column Synonyms
// ============================================================================

/// Accepted header texts for each canonical field, in evaluation order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSynonyms {
    pub task: Vec<String>,
    pub start: Vec<String>,
    pub end: Vec<String>,
    pub wbs: Vec<String>,
    pub owner: Vec<String>,
}

impl Default for ColumnSynonyms {
    fn default() -> Self {
        fn list(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| (*s).to_string()).collect()
        }
        Self {
            task: list(&["task", "activity", "công việc", "hạng mục", "nhiệm vụ"]),
            start: list(&["start", "begin", "bắt đầu", "từ ngày"]),
            end: list(&["end", "finish", "due", "kết thúc", "hoàn thành", "đến ngày"]),
            wbs: list(&["wbs", "code", "mã hiệu", "stt"]),
            owner: list(&["owner", "lead", "responsible", "assignee", "phụ trách", "người"]),
        }
    }
}

impl ColumnSynonyms {
    pub fn for_field(&self, field: Field) -> &[String] {
        match field {
            Field::Task => &self.task,
            Field::Start => &self.start,
            Field::End => &self.end,
            Field::Wbs => &self.wbs,
            Field::Owner => &self.owner,
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Keyword rule: any keyword found in the task text assigns `category`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub category: CategoryId,
    /// Single words or multi-word phrases, compared case- and diacritic-insensitively
    pub keywords: Vec<String>,
}

impl ClassificationRule {
    pub fn new(category: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            category: category.into(),
            keywords: keywords.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

// ============================================================================
// Layout Options
// ============================================================================

/// Upper bound for `year_band_pad_days`
pub const MAX_YEAR_BAND_PAD_DAYS: i64 = 366;

/// Geometry constants for the layout engine (row units unless noted)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Height of one task row
    pub row_height: f64,
    /// Gap added after every row
    pub row_spacing: f64,
    /// Extra gap between consecutive tracks
    pub track_gap: f64,
    /// Distance of the legend band above row 0
    pub legend_offset: f64,
    /// chrono format applied to the first day of each month band
    pub month_label_format: String,
    /// Days appended to the end of the final year band
    pub year_band_pad_days: i64,
    pub milestone_label: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            row_height: 1.0,
            row_spacing: 0.3,
            track_gap: 0.5,
            legend_offset: 1.5,
            month_label_format: "%m".into(),
            year_band_pad_days: 1,
            milestone_label: "Completion".into(),
        }
    }
}

// ============================================================================
// Schedule Config
// ============================================================================

/// Complete pipeline configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Maximum number of rows scanned for the header (unlimited when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_scan_limit: Option<usize>,
    /// Rows whose start or end year is at or below this are dropped
    pub date_sentinel_year: i32,
    pub date_order: DateOrder,
    /// Joins WBS code and task name into the label
    pub label_separator: String,
    pub phases: Vec<String>,
    pub default_category: CategoryId,
    pub columns: ColumnSynonyms,
    pub layout: LayoutOptions,
    /// Display order of tracks and legend
    pub categories: Vec<Category>,
    /// Evaluated top to bottom, first match wins
    pub classification_rules: Vec<ClassificationRule>,
    /// Leading WBS number → category
    pub wbs_prefix_fallback: BTreeMap<String, CategoryId>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let categories = vec![
            Category::new("management", "Management", "#8e44ad"),
            Category::new("design", "Design", "#3498db"),
            Category::new("procurement", "Procurement", "#e67e22"),
            Category::new("execution", "Execution", "#27ae60"),
            Category::new("testing", "Testing", "#e74c3c"),
            Category::new("handover", "Handover", "#16a085"),
            Category::new("other", "Other", "#95a5a6"),
        ];

        let classification_rules = vec![
            ClassificationRule::new(
                "management",
                &["kickoff", "kick off", "meeting", "planning", "plan", "approval", "report", "họp", "kế hoạch", "phê duyệt"],
            ),
            ClassificationRule::new(
                "design",
                &["design", "drawing", "drawings", "survey", "specification", "thiết kế", "bản vẽ", "khảo sát"],
            ),
            ClassificationRule::new(
                "procurement",
                &["procurement", "purchase", "order", "supplier", "tender", "bidding", "mua sắm", "đặt hàng", "đấu thầu"],
            ),
            ClassificationRule::new(
                "testing",
                &["test", "testing", "inspection", "commissioning", "qa", "kiểm tra", "nghiệm thu", "chạy thử"],
            ),
            ClassificationRule::new(
                "handover",
                &["handover", "go live", "closeout", "training", "bàn giao", "đào tạo"],
            ),
            ClassificationRule::new(
                "execution",
                &["install", "installation", "build", "construction", "development", "implement", "implementation", "thi công", "lắp đặt", "xây dựng"],
            ),
        ];

        let wbs_prefix_fallback = [
            ("1", "management"),
            ("2", "design"),
            ("3", "procurement"),
            ("4", "execution"),
            ("5", "testing"),
            ("6", "handover"),
        ]
        .into_iter()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect();

        Self {
            header_scan_limit: None,
            date_sentinel_year: 1900,
            date_order: DateOrder::default(),
            label_separator: ". ".into(),
            phases: vec![
                "Initiation".into(),
                "Planning".into(),
                "Execution".into(),
                "Monitoring".into(),
                "Closure".into(),
            ],
            default_category: "other".into(),
            columns: ColumnSynonyms::default(),
            layout: LayoutOptions::default(),
            categories,
            classification_rules,
            wbs_prefix_fallback,
        }
    }
}

impl ScheduleConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Look up a configured category
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn is_known_category(&self, id: &str) -> bool {
        self.category(id).is_some()
    }

    /// Check the configuration is internally consistent.
    ///
    /// A valid configuration guarantees the classifier can only ever produce
    /// configured categories.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phases.is_empty() {
            return Err(ConfigError::NoPhases);
        }
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.id.as_str()) {
                return Err(ConfigError::DuplicateCategory(category.id.clone()));
            }
        }

        let unknown = |category: &str, context: String| ConfigError::UnknownCategory {
            category: category.to_string(),
            context,
        };

        if !seen.contains(self.default_category.as_str()) {
            return Err(unknown(&self.default_category, "default_category".into()));
        }
        for (i, rule) in self.classification_rules.iter().enumerate() {
            if !seen.contains(rule.category.as_str()) {
                return Err(unknown(&rule.category, format!("classification rule #{}", i + 1)));
            }
        }
        for (prefix, category) in &self.wbs_prefix_fallback {
            if !seen.contains(category.as_str()) {
                return Err(unknown(category, format!("WBS prefix '{}'", prefix)));
            }
        }

        for field in Field::ALL.into_iter().filter(|f| f.is_required()) {
            let synonyms = self.columns.for_field(field);
            if synonyms.iter().all(|s| s.trim().is_empty()) {
                return Err(ConfigError::EmptySynonyms(field));
            }
        }

        let layout = &self.layout;
        if !(layout.row_height > 0.0) {
            return Err(ConfigError::InvalidLayout("row_height must be positive".into()));
        }
        if layout.row_spacing < 0.0 || layout.track_gap < 0.0 {
            return Err(ConfigError::InvalidLayout(
                "row_spacing and track_gap must not be negative".into(),
            ));
        }
        if !(0..=MAX_YEAR_BAND_PAD_DAYS).contains(&layout.year_band_pad_days) {
            return Err(ConfigError::InvalidLayout(format!(
                "year_band_pad_days must be between 0 and {MAX_YEAR_BAND_PAD_DAYS}"
            )));
        }
        if StrftimeItems::new(&layout.month_label_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidLayout(format!(
                "month_label_format '{}' is not a valid date format",
                layout.month_label_format
            )));
        }

        Ok(())
    }
}
