//! Doccat command line
//!
//! `prepare` splits and persists the dataset, `train` additionally runs the
//! external trainer, `evaluate` scores the test set with a trained model.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use doccat_core::split::SplitConfig;
use doccat_core::{
    BowCategorizer, ClassMetricsTable, ConfusionTable, EvaluateConfig, run_evaluation,
};
use doccat_trainer::{PrepareConfig, TrainerCommand, TrainingConfig, prepare_data, run_training};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Parser)]
#[command(name = "doccat")]
#[command(about = "Prepare, train and evaluate a document categorizer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the input TSV and persist train/valid/test documents
    Prepare(PrepareArgs),
    /// Prepare the data, then run the external trainer
    Train {
        #[command(flatten)]
        prepare: PrepareArgs,

        /// Configuration file passed to the trainer
        #[arg(short, long, env = "DOCCAT_TRAINER_CONFIG", default_value = "config.cfg")]
        config: PathBuf,

        /// Directory the trainer writes models into
        #[arg(short, long, env = "DOCCAT_OUTPUT_DIR", default_value = "./output")]
        output: PathBuf,

        /// Trainer command line; may use {config}, {output}, {train} and {valid}
        #[arg(long, env = "DOCCAT_TRAINER_CMD")]
        trainer_cmd: Option<String>,
    },
    /// Score the test set and report accuracy and the confusion matrix
    Evaluate {
        /// Exported model directory
        #[arg(short, long, env = "DOCCAT_MODEL_DIR", default_value = "./output/model-best")]
        model: PathBuf,

        /// Persisted test documents
        #[arg(short, long, default_value = "./data/test.docs")]
        test: PathBuf,

        /// Output for the test documents with predictions
        #[arg(long, default_value = "./data/test_with_pred.docs")]
        predictions: PathBuf,

        /// Write label/predicted/score rows as TSV
        #[arg(long)]
        results: Option<PathBuf>,

        /// Write the confusion matrix as CSV
        #[arg(long)]
        confusion_csv: Option<PathBuf>,

        /// Also print per-class precision and recall
        #[arg(long)]
        per_class: bool,
    },
}

#[derive(Args)]
struct PrepareArgs {
    /// Input TSV with title, text and category columns
    #[arg(short, long, env = "DOCCAT_INPUT", default_value = "./data/data_redacted.tsv")]
    input: PathBuf,

    /// Directory for the persisted documents
    #[arg(short, long, env = "DOCCAT_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Share of all records held out for testing
    #[arg(long, default_value_t = 0.15)]
    test_ratio: f64,

    /// Share of the remaining records held out for validation
    #[arg(long, default_value_t = 0.1)]
    validation_ratio: f64,

    /// Shuffle seed
    #[arg(long, env = "DOCCAT_SEED", default_value_t = 1)]
    seed: u64,
}

impl PrepareArgs {
    fn into_config(self) -> PrepareConfig {
        PrepareConfig::new()
            .with_input(self.input)
            .with_data_dir(self.data_dir)
            .with_split(
                SplitConfig::new()
                    .with_test_ratio(self.test_ratio)
                    .with_validation_ratio(self.validation_ratio)
                    .with_seed(self.seed),
            )
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare(args) => {
            let prepared = prepare_data(&args.into_config())?;
            info!(
                train = prepared.train,
                validation = prepared.validation,
                test = prepared.test,
                "data prepared"
            );
        }
        Commands::Train {
            prepare,
            config,
            output,
            trainer_cmd,
        } => {
            let command = match trainer_cmd {
                Some(line) => TrainerCommand::parse(&line).context("trainer command is empty")?,
                None => TrainerCommand::default(),
            };
            let training = TrainingConfig::new()
                .with_prepare(prepare.into_config())
                .with_trainer_config(config)
                .with_output_dir(output)
                .with_command(command);
            run_training(&training)?;
        }
        Commands::Evaluate {
            model,
            test,
            predictions,
            results,
            confusion_csv,
            per_class,
        } => {
            let mut config = EvaluateConfig::new()
                .with_model_dir(model)
                .with_test_path(test)
                .with_predictions_path(predictions);
            if let Some(path) = results {
                config = config.with_results_path(path);
            }
            if let Some(path) = confusion_csv {
                config = config.with_confusion_csv(path);
            }

            let categorizer = BowCategorizer::load(&config.model_dir)
                .with_context(|| format!("failed to load model {}", config.model_dir.display()))?;
            let evaluation = run_evaluation(&config, &categorizer)?;

            println!("overall accuracy: {:.2}", evaluation.accuracy);
            println!();
            print!("{}", ConfusionTable(&evaluation.confusion));
            if per_class {
                println!();
                print!("{}", ClassMetricsTable(&evaluation.confusion));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn prepare_args_build_split_config() {
        let cli = Cli::try_parse_from([
            "doccat",
            "prepare",
            "--input",
            "in.tsv",
            "--test-ratio",
            "0.2",
            "--seed",
            "9",
        ])
        .unwrap();
        let Commands::Prepare(args) = cli.command else {
            panic!("expected prepare");
        };
        let config = args.into_config();
        assert_eq!(config.input, PathBuf::from("in.tsv"));
        assert_eq!(config.split.test_ratio, 0.2);
        assert_eq!(config.split.validation_ratio, 0.1);
        assert_eq!(config.split.seed, 9);
    }
}
