//! End-to-end pipeline: source → entries → classification → layout

use crate::classifier::{classify_entries, RuleClassifier};
use crate::layout::compute_layout;
use sheetline_core::{Classifier, ConfigError, LayoutModel, RawGrid, ScheduleConfig};
use sheetline_ingest::{
    ingest_bytes, ingest_grid, ingest_path, IngestError, IngestWarning, Ingestion, ReadOptions,
    SourceFormat,
};
use std::path::Path;
use thiserror::Error;

/// Pipeline error
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Result of one pipeline run
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// Ingestion result with classified entries
    pub ingestion: Ingestion,
    pub layout: LayoutModel,
}

impl Outcome {
    pub fn warnings(&self) -> Vec<IngestWarning> {
        self.ingestion.warnings()
    }

    /// True when nothing survived validation
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }
}

/// Configured pipeline, reusable across any number of sources
pub struct Pipeline {
    config: ScheduleConfig,
    classifier: Box<dyn Classifier>,
}

impl Pipeline {
    /// Build a pipeline with the rule classifier described by `config`
    pub fn new(config: ScheduleConfig) -> Result<Self, ConfigError> {
        let classifier = RuleClassifier::from_config(&config)?;
        Ok(Self {
            config,
            classifier: Box::new(classifier),
        })
    }

    /// Replace the classifier.
    ///
    /// Categories it returns that the configuration does not know are laid
    /// out on the default track.
    pub fn with_classifier(mut self, classifier: Box<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn run_grid(&self, grid: &RawGrid) -> Result<Outcome, PipelineError> {
        let ingestion = ingest_grid(grid, &self.config)?;
        Ok(self.finish(ingestion))
    }

    pub fn run_bytes(
        &self,
        bytes: &[u8],
        format: SourceFormat,
        options: &ReadOptions,
    ) -> Result<Outcome, PipelineError> {
        let ingestion = ingest_bytes(bytes, format, options, &self.config)?;
        Ok(self.finish(ingestion))
    }

    pub fn run_path(&self, path: &Path, options: &ReadOptions) -> Result<Outcome, PipelineError> {
        let ingestion = ingest_path(path, options, &self.config)?;
        Ok(self.finish(ingestion))
    }

    fn finish(&self, mut ingestion: Ingestion) -> Outcome {
        let entries = std::mem::take(&mut ingestion.report.entries);
        ingestion.report.entries = classify_entries(entries, self.classifier.as_ref());

        for warning in ingestion.warnings() {
            tracing::warn!(%warning, "ingestion produced no entries");
        }

        let layout = compute_layout(&ingestion.report.entries, &self.config);
        Outcome { ingestion, layout }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetline_core::{CategoryId, ScheduleEntry};

    struct Everything(&'static str);

    impl Classifier for Everything {
        fn classify(&self, _entry: &ScheduleEntry) -> CategoryId {
            self.0.to_string()
        }
    }

    fn grid() -> RawGrid {
        RawGrid::from_text_rows(vec![
            vec!["Task", "Start", "End"],
            vec!["Kickoff meeting", "2025-01-01", "2025-01-02"],
            vec!["Install racks", "2025-01-05", "2025-01-20"],
        ])
    }

    #[test]
    fn runs_all_stages() {
        let pipeline = Pipeline::new(ScheduleConfig::default()).unwrap();
        let outcome = pipeline.run_grid(&grid()).unwrap();

        let categories: Vec<Option<&str>> = outcome
            .ingestion
            .report
            .entries
            .iter()
            .map(|e| e.category.as_deref())
            .collect();
        assert_eq!(categories, vec![Some("management"), Some("execution")]);
        assert_eq!(outcome.layout.rows.len(), 2);
        assert!(outcome.warnings().is_empty());
    }

    #[test]
    fn custom_classifier_is_used() {
        let pipeline = Pipeline::new(ScheduleConfig::default())
            .unwrap()
            .with_classifier(Box::new(Everything("testing")));
        let outcome = pipeline.run_grid(&grid()).unwrap();
        assert_eq!(outcome.layout.tracks.len(), 1);
        assert_eq!(outcome.layout.tracks[0].category, "testing");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ScheduleConfig {
            phases: vec![],
            ..ScheduleConfig::default()
        };
        assert!(matches!(Pipeline::new(config), Err(ConfigError::NoPhases)));
    }

    #[test]
    fn structural_failures_propagate() {
        let pipeline = Pipeline::new(ScheduleConfig::default()).unwrap();
        let grid = RawGrid::from_text_rows(vec![vec!["Name", "When"]]);
        assert!(matches!(
            pipeline.run_grid(&grid),
            Err(PipelineError::Ingest(IngestError::HeaderNotFound { .. }))
        ));
    }
}
