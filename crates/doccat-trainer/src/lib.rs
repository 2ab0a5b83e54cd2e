//! # Doccat Trainer
//!
//! The training side of the pipeline: turns the raw TSV dataset into
//! persisted train / validation / test documents and hands them to an
//! external trainer process.

pub mod command;
pub mod prepare;
pub mod trainer;

pub use command::{TrainerCommand, TrainingPaths};
pub use prepare::{PrepareConfig, PreparedData, prepare_data};
pub use trainer::{TrainingConfig, run_training, train};
