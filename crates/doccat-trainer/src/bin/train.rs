use std::path::PathBuf;

use doccat_trainer::{PrepareConfig, TrainerCommand, TrainingConfig, run_training};
use tracing_subscriber::EnvFilter;

fn config_from_env() -> TrainingConfig {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

    let mut prepare = PrepareConfig::default();
    if let Some(input) = var("DOCCAT_INPUT") {
        prepare = prepare.with_input(input);
    }
    if let Some(dir) = var("DOCCAT_DATA_DIR") {
        prepare = prepare.with_data_dir(dir);
    }

    let mut config = TrainingConfig::default().with_prepare(prepare);
    if let Some(path) = var("DOCCAT_TRAINER_CONFIG") {
        config = config.with_trainer_config(PathBuf::from(path));
    }
    if let Some(dir) = var("DOCCAT_OUTPUT_DIR") {
        config = config.with_output_dir(dir);
    }
    if let Some(command) = var("DOCCAT_TRAINER_CMD").and_then(|c| TrainerCommand::parse(&c)) {
        config = config.with_command(command);
    }
    config
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run_training(&config_from_env()) {
        eprintln!("Training failed: {e:#}");
        std::process::exit(1);
    }
}
