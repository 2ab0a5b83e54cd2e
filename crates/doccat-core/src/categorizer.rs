//! # Text Categorizer
//!
//! Inference over a pre-trained text categorizer exported by the external
//! trainer. A model directory holds:
//!
//! - `config.json`: `{"labels": [...], "exclusive": true}`
//! - `tokenizer.json`: a Hugging Face tokenizer
//! - `model.safetensors`: `textcat.weight` `[labels, vocab]` and `textcat.bias` `[labels]`
//!
//! Tokenization runs through the `tokenizers` file shipped with the model;
//! the layer itself is memory-mapped and evaluated with candle on the CPU.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer as HfTokenizer;
use tracing::{debug, info};

use crate::error::{DoccatError, Result};
use crate::types::{Category, CategoryScores};

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";
const WEIGHT_TENSOR: &str = "textcat.weight";
/// Largest safetensors JSON header accepted, matching the `safetensors` crate.
const MAX_HEADER_LEN: u64 = 100_000_000;

/// Anything that maps a text to per-category scores.
pub trait TextCategorizer {
    /// Score a single text.
    fn score(&self, text: &str) -> Result<CategoryScores>;

    /// Score texts in order.
    fn score_batch(&self, texts: &[&str]) -> Result<Vec<CategoryScores>> {
        texts.iter().map(|text| self.score(text)).collect()
    }
}

/// `config.json` of an exported model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Output labels in the row order of `textcat.weight`.
    pub labels: Vec<String>,
    /// Mutually exclusive classes (softmax) or independent ones (sigmoid).
    #[serde(default = "default_exclusive")]
    pub exclusive: bool,
}

fn default_exclusive() -> bool {
    true
}

impl ModelConfig {
    /// Map the label names onto categories, requiring a permutation of [`Category::ALL`].
    pub fn categories(&self) -> Result<Vec<Category>> {
        let mut seen = [false; Category::COUNT];
        let mut cats = Vec::with_capacity(self.labels.len());
        for label in &self.labels {
            let cat: Category = label.parse()?;
            if seen[cat.index()] {
                return Err(DoccatError::CategoryMismatch(format!(
                    "model label {cat} appears more than once"
                )));
            }
            seen[cat.index()] = true;
            cats.push(cat);
        }
        if cats.len() != Category::COUNT {
            return Err(DoccatError::CategoryMismatch(format!(
                "model has {} labels, expected {}",
                cats.len(),
                Category::COUNT
            )));
        }
        Ok(cats)
    }
}

/// Bag-of-words linear categorizer.
///
/// Ties in [`CategoryScores::top`] follow canonical [`Category::ALL`] order,
/// not the label order of `config.json`.
pub struct BowCategorizer {
    tokenizer: HfTokenizer,
    textcat: Linear,
    labels: Vec<Category>,
    vocab_size: usize,
    exclusive: bool,
    device: Device,
}

impl BowCategorizer {
    /// Load an exported model directory (e.g. `output/model-best`).
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let device = Device::Cpu;

        let config_path = dir.join(CONFIG_FILE);
        let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
            DoccatError::ModelLoad(format!("failed to read {}: {e}", config_path.display()))
        })?;
        let config: ModelConfig = serde_json::from_str(&config_str)
            .map_err(|e| DoccatError::ModelLoad(format!("failed to parse config: {e}")))?;
        let labels = config.categories()?;

        let tokenizer_path = dir.join(TOKENIZER_FILE);
        if !tokenizer_path.exists() {
            return Err(DoccatError::ModelLoad(format!(
                "tokenizer not found at {}",
                tokenizer_path.display()
            )));
        }
        let tokenizer = HfTokenizer::from_file(&tokenizer_path)
            .map_err(|e| DoccatError::ModelLoad(e.to_string()))?;

        let weights_path = dir.join(WEIGHTS_FILE);
        if !weights_path.exists() {
            return Err(DoccatError::ModelLoad(format!(
                "model not found at {}",
                weights_path.display()
            )));
        }
        let vocab_size = weight_input_dim(&weights_path, labels.len())?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, &device)
        }
        .map_err(|e| DoccatError::Candle(e.to_string()))?;
        let textcat = candle_nn::linear(vocab_size, labels.len(), vb.pp("textcat"))
            .map_err(|e| DoccatError::Candle(e.to_string()))?;

        info!(
            model = %dir.display(),
            vocab_size,
            exclusive = config.exclusive,
            "loaded text categorizer"
        );

        Self::from_parts(tokenizer, textcat, labels, config.exclusive)
    }

    /// Assemble a categorizer from an already loaded tokenizer and layer.
    ///
    /// `textcat` must map `[1, vocab]` to `[1, labels.len()]`.
    pub fn from_parts(
        tokenizer: HfTokenizer,
        textcat: Linear,
        labels: Vec<Category>,
        exclusive: bool,
    ) -> Result<Self> {
        let (rows, vocab_size) = textcat
            .weight()
            .dims2()
            .map_err(|e| DoccatError::Candle(e.to_string()))?;
        if rows != labels.len() {
            return Err(DoccatError::CategoryMismatch(format!(
                "layer has {rows} outputs for {} labels",
                labels.len()
            )));
        }
        let device = textcat.weight().device().clone();

        Ok(Self {
            tokenizer,
            textcat,
            labels,
            vocab_size,
            exclusive,
            device,
        })
    }

    /// Normalized token counts over the vocabulary.
    fn features(&self, text: &str) -> Result<Tensor> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| DoccatError::Inference(format!("tokenize error: {e}")))?;

        let mut counts = vec![0f32; self.vocab_size];
        let mut total = 0usize;
        for &id in encoding.get_ids() {
            if let Some(slot) = counts.get_mut(id as usize) {
                *slot += 1.0;
                total += 1;
            }
        }
        if total > 0 {
            let norm = total as f32;
            counts.iter_mut().for_each(|c| *c /= norm);
        }

        Tensor::from_vec(counts, (1, self.vocab_size), &self.device)
            .map_err(|e| DoccatError::Candle(e.to_string()))
    }
}

impl TextCategorizer for BowCategorizer {
    fn score(&self, text: &str) -> Result<CategoryScores> {
        let features = self.features(text)?;
        let logits = self
            .textcat
            .forward(&features)
            .map_err(|e| DoccatError::Candle(e.to_string()))?;

        let probs = if self.exclusive {
            candle_nn::ops::softmax_last_dim(&logits)
        } else {
            candle_nn::ops::sigmoid(&logits)
        }
        .map_err(|e| DoccatError::Candle(e.to_string()))?;

        let values: Vec<f32> = probs
            .squeeze(0)
            .and_then(|t| t.to_vec1())
            .map_err(|e| DoccatError::Candle(e.to_string()))?;
        if values.len() != self.labels.len() {
            return Err(DoccatError::Inference(format!(
                "model produced {} scores for {} labels",
                values.len(),
                self.labels.len()
            )));
        }

        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(DoccatError::Inference(format!(
                "model produced a non-finite score for {}",
                self.labels[pos]
            )));
        }

        debug!(chars = text.len(), "scored document");
        CategoryScores::from_pairs(self.labels.iter().copied().zip(values))
    }
}

/// Vocabulary width of `textcat.weight`, checking its row count against the labels.
///
/// Only the JSON header of the safetensors file is read.
fn weight_input_dim(path: &Path, num_labels: usize) -> Result<usize> {
    let invalid = |reason: String| DoccatError::ModelLoad(format!("invalid safetensors: {reason}"));

    let mut file = File::open(path)
        .map_err(|e| DoccatError::ModelLoad(format!("failed to read weights: {e}")))?;
    let mut len_bytes = [0u8; 8];
    file.read_exact(&mut len_bytes)
        .map_err(|e| invalid(format!("header length: {e}")))?;
    let header_len = u64::from_le_bytes(len_bytes);
    if header_len > MAX_HEADER_LEN {
        return Err(invalid(format!("header of {header_len} bytes is too large")));
    }

    let mut header = Vec::new();
    file.take(header_len)
        .read_to_end(&mut header)
        .map_err(|e| invalid(format!("header: {e}")))?;
    if header.len() as u64 != header_len {
        return Err(invalid("truncated header".into()));
    }
    let metadata: safetensors::tensor::Metadata =
        serde_json::from_slice(&header).map_err(|e| invalid(e.to_string()))?;

    let weight = metadata
        .info(WEIGHT_TENSOR)
        .ok_or_else(|| DoccatError::ModelLoad(format!("{WEIGHT_TENSOR} not found")))?;
    match weight.shape.as_slice() {
        [rows, cols] if *rows == num_labels => Ok(*cols),
        shape => Err(DoccatError::ModelLoad(format!(
            "{WEIGHT_TENSOR} has shape {shape:?}, expected [{num_labels}, vocab]"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_config_requires_full_label_set() {
        let config = ModelConfig {
            labels: Category::ALL.iter().rev().map(|c| c.to_string()).collect(),
            exclusive: true,
        };
        let cats = config.categories().unwrap();
        assert_eq!(cats[0], Category::CarsMotors);
        assert_eq!(cats.len(), Category::COUNT);

        let short = ModelConfig {
            labels: vec!["sports".into(), "news".into()],
            exclusive: true,
        };
        assert!(matches!(
            short.categories(),
            Err(DoccatError::CategoryMismatch(_))
        ));

        let mut dup_labels: Vec<String> = Category::ALL.iter().map(|c| c.to_string()).collect();
        dup_labels[1] = "sports".into();
        let dup = ModelConfig {
            labels: dup_labels,
            exclusive: true,
        };
        assert!(matches!(dup.categories(), Err(DoccatError::CategoryMismatch(_))));
    }

    #[test]
    fn model_config_defaults_to_exclusive() {
        let config: ModelConfig = serde_json::from_str(r#"{"labels": []}"#).unwrap();
        assert!(config.exclusive);
    }

    #[test]
    fn weight_header_gives_vocab_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WEIGHTS_FILE);
        let weight = Tensor::zeros((Category::COUNT, 7), DType::F32, &Device::Cpu).unwrap();
        weight.save_safetensors(WEIGHT_TENSOR, &path).unwrap();

        assert_eq!(weight_input_dim(&path, Category::COUNT).unwrap(), 7);
        assert!(matches!(
            weight_input_dim(&path, 3),
            Err(DoccatError::ModelLoad(_))
        ));
    }

    #[test]
    fn truncated_weights_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(WEIGHTS_FILE);
        std::fs::write(&path, [64u8, 0, 0, 0, 0, 0, 0, 0, b'{']).unwrap();

        assert!(matches!(
            weight_input_dim(&path, Category::COUNT),
            Err(DoccatError::ModelLoad(_))
        ));
    }

    #[test]
    fn load_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            BowCategorizer::load(dir.path()),
            Err(DoccatError::ModelLoad(_))
        ));
    }
}
