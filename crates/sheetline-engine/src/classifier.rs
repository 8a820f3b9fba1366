//! Rule-based task classification
//!
//! Two tiers, evaluated in order:
//! 1. keyword rules against the words of the label and task name, first
//!    matching rule wins
//! 2. the leading number of the WBS code looked up in the prefix table
//!
//! Anything left over goes to the default category.

use sheetline_core::text::{words, Phrase};
use sheetline_core::{CategoryId, Classifier, ConfigError, ScheduleConfig, ScheduleEntry};
use std::collections::BTreeMap;

struct CompiledRule {
    category: CategoryId,
    phrases: Vec<Phrase>,
}

/// Classifier driven by the rule tables of a [`ScheduleConfig`]
pub struct RuleClassifier {
    rules: Vec<CompiledRule>,
    prefixes: BTreeMap<String, CategoryId>,
    default_category: CategoryId,
}

impl RuleClassifier {
    /// Compile the rule tables of a validated configuration.
    ///
    /// Validation guarantees every category this classifier can return is a
    /// configured one.
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rules = config
            .classification_rules
            .iter()
            .map(|rule| CompiledRule {
                category: rule.category.clone(),
                phrases: rule
                    .keywords
                    .iter()
                    .map(|k| Phrase::new(k))
                    .filter(|p| !p.is_empty())
                    .collect(),
            })
            .collect();

        let prefixes = config
            .wbs_prefix_fallback
            .iter()
            .map(|(prefix, category)| (prefix.trim().to_string(), category.clone()))
            .collect();

        Ok(Self {
            rules,
            prefixes,
            default_category: config.default_category.clone(),
        })
    }

    fn by_keywords(&self, entry: &ScheduleEntry) -> Option<&CategoryId> {
        let label = words(&entry.label);
        let task = words(&entry.task);
        self.rules
            .iter()
            .find(|rule| {
                rule.phrases
                    .iter()
                    .any(|p| p.occurs_in(&label) || p.occurs_in(&task))
            })
            .map(|rule| &rule.category)
    }

    fn by_wbs_prefix(&self, entry: &ScheduleEntry) -> Option<&CategoryId> {
        let prefix = wbs_prefix(entry.wbs.as_deref()?)?;
        self.prefixes.get(prefix)
    }
}

impl Classifier for RuleClassifier {
    fn classify(&self, entry: &ScheduleEntry) -> CategoryId {
        self.by_keywords(entry)
            .or_else(|| self.by_wbs_prefix(entry))
            .unwrap_or(&self.default_category)
            .clone()
    }
}

/// Leading run of digits of a WBS code (`"2"` for `"2.1.3"`)
pub fn wbs_prefix(code: &str) -> Option<&str> {
    let code = code.trim();
    let end = code
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(code.len());
    (end > 0).then(|| &code[..end])
}

/// Assign a category to every entry
pub fn classify_entries(entries: Vec<ScheduleEntry>, classifier: &dyn Classifier) -> Vec<ScheduleEntry> {
    entries
        .into_iter()
        .map(|entry| {
            let category = classifier.classify(&entry);
            tracing::trace!(ordinal = entry.ordinal, %category, "classified entry");
            entry.with_category(category)
        })
        .collect()
}
