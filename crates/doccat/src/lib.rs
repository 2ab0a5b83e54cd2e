//! # Doccat
//!
//! Prepare a labeled news corpus, train a twelve-category text categorizer
//! through an external trainer and evaluate its predictions.
//!
//! The heavy lifting lives in [`doccat_core`] (documents, inference,
//! metrics) and [`doccat_trainer`] (data preparation and trainer
//! orchestration).

pub use doccat_core;
pub use doccat_trainer;

pub use doccat_core::{
    BowCategorizer, Category, CategoryScores, ConfusionMatrix, DocStore, DoccatError, Document,
    EvaluateConfig, Evaluation, Prediction, RawRecord, TextCategorizer, run_evaluation,
};
pub use doccat_trainer::{PrepareConfig, TrainerCommand, TrainingConfig, run_training};
