//! # Evaluation Stage
//!
//! Reload the persisted test set, run the categorizer over it, persist the
//! annotated copy and compute metrics.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::categorizer::TextCategorizer;
use crate::error::Result;
use crate::metrics::{Evaluation, evaluate};
use crate::predict::{predict, results_table, true_labels, write_results_tsv};
use crate::report::write_confusion_csv;
use crate::store::DocStore;
use crate::types::Category;

/// Paths used by the evaluation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateConfig {
    /// Exported model directory.
    pub model_dir: PathBuf,
    /// Persisted test documents.
    pub test_path: PathBuf,
    /// Where the test documents with predictions are written.
    pub predictions_path: PathBuf,
    /// Optional TSV of label / predicted / score rows.
    pub results_path: Option<PathBuf>,
    /// Optional CSV export of the confusion matrix.
    pub confusion_csv: Option<PathBuf>,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./output/model-best"),
            test_path: PathBuf::from("./data/test.docs"),
            predictions_path: PathBuf::from("./data/test_with_pred.docs"),
            results_path: None,
            confusion_csv: None,
        }
    }
}

impl EvaluateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    pub fn with_test_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.test_path = path.into();
        self
    }

    pub fn with_predictions_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.predictions_path = path.into();
        self
    }

    pub fn with_results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = Some(path.into());
        self
    }

    pub fn with_confusion_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.confusion_csv = Some(path.into());
        self
    }
}

/// Run the evaluation stage with an already loaded categorizer.
pub fn run_evaluation<C>(config: &EvaluateConfig, categorizer: &C) -> Result<Evaluation>
where
    C: TextCategorizer + ?Sized,
{
    let mut store = DocStore::from_disk(&config.test_path)?;
    info!(path = %config.test_path.display(), docs = store.len(), "restored test set");

    let labels = true_labels(store.docs())?;
    let predictions = predict(store.docs_mut(), categorizer)?;

    store.to_disk(&config.predictions_path)?;

    if let Some(path) = &config.results_path {
        let rows = results_table(&labels, &predictions)?;
        write_results_tsv(path, &rows)?;
    }

    let evaluation = evaluate(&labels, &predictions, &Category::ALL)?;

    if let Some(path) = &config.confusion_csv {
        write_confusion_csv(path, &evaluation.confusion)?;
    }

    Ok(evaluation)
}
