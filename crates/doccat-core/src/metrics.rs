//! # Evaluation Metrics
//!
//! Overall accuracy and a category-by-category confusion matrix with
//! per-class precision, recall and F1.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DoccatError, Result};
use crate::types::{Category, Prediction};

fn check_lengths(labels: usize, predictions: usize) -> Result<()> {
    if labels != predictions {
        return Err(DoccatError::LengthMismatch {
            labels,
            predictions,
        });
    }
    if labels == 0 {
        return Err(DoccatError::EmptyEvaluation);
    }
    Ok(())
}

/// Fraction of documents whose predicted category equals the true one.
pub fn accuracy(labels: &[Category], predictions: &[Prediction]) -> Result<f64> {
    check_lengths(labels.len(), predictions.len())?;
    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|(label, pred)| **label == pred.cat)
        .count();
    Ok(correct as f64 / labels.len() as f64)
}

/// Precision, recall and F1 of a single class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub category: Category,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of documents whose true label is this class.
    pub support: usize,
}

/// Counts of true (rows) against predicted (columns) categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    categories: Vec<Category>,
    /// `counts[true][predicted]`
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Build the matrix over `categories`, in that order.
    ///
    /// Pairs where either side is not in `categories` are not counted.
    pub fn compute(
        labels: &[Category],
        predicted: &[Category],
        categories: &[Category],
    ) -> Result<Self> {
        if labels.len() != predicted.len() {
            return Err(DoccatError::LengthMismatch {
                labels: labels.len(),
                predictions: predicted.len(),
            });
        }

        let mut position = [None; Category::COUNT];
        for (i, cat) in categories.iter().enumerate() {
            position[cat.index()].get_or_insert(i);
        }

        let n = categories.len();
        let mut counts = vec![vec![0usize; n]; n];
        for (label, pred) in labels.iter().zip(predicted) {
            if let (Some(row), Some(col)) = (position[label.index()], position[pred.index()]) {
                counts[row][col] += 1;
            }
        }

        Ok(Self {
            categories: categories.to_vec(),
            counts,
        })
    }

    /// Build the matrix over the fixed category list from predictions.
    pub fn from_predictions(labels: &[Category], predictions: &[Prediction]) -> Result<Self> {
        let predicted: Vec<Category> = predictions.iter().map(|p| p.cat).collect();
        Self::compute(labels, &predicted, &Category::ALL)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Raw rows, `rows()[true][predicted]`.
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Count of documents with true label `actual` predicted as `predicted`.
    pub fn get(&self, actual: Category, predicted: Category) -> usize {
        match (self.position(actual), self.position(predicted)) {
            (Some(row), Some(col)) => self.counts[row][col],
            _ => 0,
        }
    }

    fn position(&self, cat: Category) -> Option<usize> {
        self.categories.iter().position(|c| *c == cat)
    }

    /// Per-category count of true labels.
    pub fn row_sums(&self) -> Vec<usize> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    /// Per-category count of predictions.
    pub fn column_sums(&self) -> Vec<usize> {
        (0..self.categories.len())
            .map(|col| self.counts.iter().map(|row| row[col]).sum())
            .collect()
    }

    /// Number of counted pairs.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Correct predictions (the diagonal).
    pub fn correct(&self) -> usize {
        (0..self.categories.len()).map(|i| self.counts[i][i]).sum()
    }

    /// Per-class metrics; a ratio with a zero denominator is reported as `0.0`.
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let rows = self.row_sums();
        let cols = self.column_sums();

        self.categories
            .iter()
            .enumerate()
            .map(|(i, &category)| {
                let tp = self.counts[i][i] as f64;
                let precision = ratio(tp, cols[i] as f64);
                let recall = ratio(tp, rows[i] as f64);
                let f1 = ratio(2.0 * precision * recall, precision + recall);
                ClassMetrics {
                    category,
                    precision,
                    recall,
                    f1,
                    support: rows[i],
                }
            })
            .collect()
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

/// Accuracy together with the confusion matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
}

/// Compute accuracy and the confusion matrix over `categories`.
pub fn evaluate(
    labels: &[Category],
    predictions: &[Prediction],
    categories: &[Category],
) -> Result<Evaluation> {
    let accuracy = accuracy(labels, predictions)?;
    info!("overall accuracy: {accuracy:.2}");

    let predicted: Vec<Category> = predictions.iter().map(|p| p.cat).collect();
    let confusion = ConfusionMatrix::compute(labels, &predicted, categories)?;

    Ok(Evaluation {
        accuracy,
        confusion,
    })
}
