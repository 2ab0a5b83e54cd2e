//! # Prediction
//!
//! Runs a categorizer over documents and collects the top category of each.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::categorizer::TextCategorizer;
use crate::error::{DoccatError, Result};
use crate::types::{Category, Document, Prediction};

const PROGRESS_EVERY: usize = 500;

/// Score every document, store the scores on it and return the top category per document.
pub fn predict<C>(docs: &mut [Document], categorizer: &C) -> Result<Vec<Prediction>>
where
    C: TextCategorizer + ?Sized,
{
    let total = docs.len();
    info!("processing {total} documents. that might take a while...");

    let mut predictions = Vec::with_capacity(total);
    for (idx, doc) in docs.iter_mut().enumerate() {
        let scores = categorizer.score(&doc.text)?;
        predictions.push(scores.top());
        doc.predicted = Some(scores);

        if (idx + 1) % PROGRESS_EVERY == 0 {
            debug!(done = idx + 1, total, "prediction progress");
        }
    }

    Ok(predictions)
}

/// Gold label of every document.
pub fn true_labels(docs: &[Document]) -> Result<Vec<Category>> {
    docs.iter().map(Document::true_label).collect()
}

/// One row of the results table: true category, predicted category and its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub label: Category,
    pub predicted: Category,
    pub score: f32,
}

/// Pack labels and predictions into result rows.
pub fn results_table(labels: &[Category], predictions: &[Prediction]) -> Result<Vec<ResultRow>> {
    if labels.len() != predictions.len() {
        return Err(DoccatError::LengthMismatch {
            labels: labels.len(),
            predictions: predictions.len(),
        });
    }

    Ok(labels
        .iter()
        .zip(predictions)
        .map(|(&label, p)| ResultRow {
            label,
            predicted: p.cat,
            score: p.score,
        })
        .collect())
}

/// Write result rows as a TSV file with a header.
pub fn write_results_tsv<P: AsRef<Path>>(path: P, rows: &[ResultRow]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "wrote results table");
    Ok(())
}
