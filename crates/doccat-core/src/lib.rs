//! # Doccat Core
//!
//! Labeled documents over a fixed set of twelve content categories: TSV
//! ingestion, seeded splitting, a persisted document store, inference
//! through a pre-trained categorizer and accuracy / confusion-matrix
//! evaluation.
//!
//! ## Quick Start
//!
//! ```rust
//! use doccat_core::{accuracy, Category, Prediction};
//!
//! let labels = [Category::Sports, Category::News];
//! let predictions = [
//!     Prediction { cat: Category::Sports, score: 0.9 },
//!     Prediction { cat: Category::News, score: 0.4 },
//! ];
//!
//! assert_eq!(accuracy(&labels, &predictions).unwrap(), 1.0);
//! ```
pub mod categorizer;
pub mod data;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod predict;
pub mod report;
pub mod split;
pub mod store;
pub mod types;

// Re-export primary API
pub use categorizer::{BowCategorizer, ModelConfig, TextCategorizer};
pub use data::{category_counts, load_records, read_records};
pub use error::{DoccatError, Result};
pub use evaluation::{EvaluateConfig, run_evaluation};
pub use metrics::{ClassMetrics, ConfusionMatrix, Evaluation, accuracy, evaluate};
pub use predict::{ResultRow, predict, results_table, true_labels, write_results_tsv};
pub use report::{
    ClassMetricsTable, ConfusionTable, render_class_metrics, render_confusion_matrix,
    write_confusion_csv,
};
pub use split::{DatasetSplit, SplitConfig, split_dataset, train_test_split};
pub use store::DocStore;
pub use types::{Category, CategoryScores, Document, Prediction, RawRecord};
