//! Data preparation: raw TSV records to persisted train/valid/test documents.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use doccat_core::data::{category_counts, load_records};
use doccat_core::split::{SplitConfig, split_dataset};
use doccat_core::{Category, DocStore};
use tracing::{debug, info};

pub const TRAIN_FILE: &str = "train.docs";
pub const VALID_FILE: &str = "valid.docs";
pub const TEST_FILE: &str = "test.docs";

/// Where the input lives, where documents go and how to split.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareConfig {
    pub input: PathBuf,
    pub data_dir: PathBuf,
    pub split: SplitConfig,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("./data/data_redacted.tsv"),
            data_dir: PathBuf::from("./data"),
            split: SplitConfig::default(),
        }
    }
}

impl PrepareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    pub fn train_path(&self) -> PathBuf {
        self.data_dir.join(TRAIN_FILE)
    }

    pub fn valid_path(&self) -> PathBuf {
        self.data_dir.join(VALID_FILE)
    }

    pub fn test_path(&self) -> PathBuf {
        self.data_dir.join(TEST_FILE)
    }
}

/// Paths and sizes of the persisted splits.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedData {
    pub train_path: PathBuf,
    pub valid_path: PathBuf,
    pub test_path: PathBuf,
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

fn save_split(records: &[doccat_core::RawRecord], path: &Path) -> Result<()> {
    DocStore::from_records(records)
        .to_disk(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Load, split and persist the dataset.
pub fn prepare_data(config: &PrepareConfig) -> Result<PreparedData> {
    let records = load_records(&config.input)
        .with_context(|| format!("failed to read input data {}", config.input.display()))?;

    for (cat, count) in Category::ALL.iter().zip(category_counts(&records)) {
        debug!(category = %cat, count, "class balance");
    }

    let split = split_dataset(records, &config.split)?;

    info!("preparing data for training...");
    let prepared = PreparedData {
        train_path: config.train_path(),
        valid_path: config.valid_path(),
        test_path: config.test_path(),
        train: split.train.len(),
        validation: split.validation.len(),
        test: split.test.len(),
    };
    save_split(&split.train, &prepared.train_path)?;
    save_split(&split.validation, &prepared.valid_path)?;
    save_split(&split.test, &prepared.test_path)?;

    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_live_in_data_dir() {
        let config = PrepareConfig::new().with_data_dir("/tmp/corpus");
        assert_eq!(config.train_path(), PathBuf::from("/tmp/corpus/train.docs"));
        assert_eq!(config.valid_path(), PathBuf::from("/tmp/corpus/valid.docs"));
        assert_eq!(config.test_path(), PathBuf::from("/tmp/corpus/test.docs"));
    }

    #[test]
    fn missing_input_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let config = PrepareConfig::new()
            .with_input(dir.path().join("absent.tsv"))
            .with_data_dir(dir.path());
        let err = prepare_data(&config).unwrap_err();
        assert!(err.to_string().contains("absent.tsv"));
    }
}
