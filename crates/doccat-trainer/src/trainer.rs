//! Prepare-then-train orchestration.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::command::{TrainerCommand, TrainingPaths};
use crate::prepare::{PrepareConfig, PreparedData, prepare_data};

/// Everything the training stage needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub prepare: PrepareConfig,
    /// Configuration file handed to the external trainer.
    pub trainer_config: PathBuf,
    /// Directory the trainer writes models into.
    pub output_dir: PathBuf,
    pub command: TrainerCommand,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            prepare: PrepareConfig::default(),
            trainer_config: PathBuf::from("config.cfg"),
            output_dir: PathBuf::from("./output"),
            command: TrainerCommand::default(),
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prepare(mut self, prepare: PrepareConfig) -> Self {
        self.prepare = prepare;
        self
    }

    pub fn with_trainer_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.trainer_config = path.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_command(mut self, command: TrainerCommand) -> Self {
        self.command = command;
        self
    }

    fn paths(&self, prepared: &PreparedData) -> TrainingPaths {
        TrainingPaths {
            config: self.trainer_config.clone(),
            output: self.output_dir.clone(),
            train: prepared.train_path.clone(),
            valid: prepared.valid_path.clone(),
        }
    }
}

/// Launch the external trainer on already prepared data.
pub fn train(config: &TrainingConfig, prepared: &PreparedData) -> Result<()> {
    info!("start training a text categorizer...");
    std::fs::create_dir_all(&config.output_dir)?;
    config.command.run(&config.paths(prepared))
}

/// Prepare the data, then train.
pub fn run_training(config: &TrainingConfig) -> Result<PreparedData> {
    let prepared = prepare_data(&config.prepare)?;
    info!(
        train = prepared.train,
        validation = prepared.validation,
        test = prepared.test,
        "prepared splits"
    );

    train(config, &prepared)?;
    Ok(prepared)
}
