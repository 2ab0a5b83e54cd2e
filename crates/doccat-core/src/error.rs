use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during doccat core operations.
#[derive(Debug, Error)]
pub enum DoccatError {
    /// Filesystem or stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tab-separated input could not be read.
    #[error("malformed TSV input: {0}")]
    Tsv(#[from] csv::Error),

    /// A JSON payload (store line, model config) could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A label outside the fixed category list.
    #[error("unknown category {label:?}{}", .row.map(|r| format!(" at row {r}")).unwrap_or_default())]
    UnknownCategory {
        /// The offending label.
        label: String,
        /// 1-based data row, when the label came from an input file.
        row: Option<usize>,
    },

    /// A score mapping or model label set does not cover the category list exactly.
    #[error("category mismatch: {0}")]
    CategoryMismatch(String),

    /// A document does not have exactly one true label.
    #[error("document {id} has {count} true labels, expected exactly one")]
    InvalidGoldLabels {
        /// Document id.
        id: usize,
        /// Number of categories flagged true.
        count: usize,
    },

    /// A split ratio outside `[0, 1)`.
    #[error("invalid split ratio {0}, expected a value in [0, 1)")]
    InvalidSplit(f64),

    /// A persisted document collection failed validation.
    #[error("corrupt document store {path:?}: {reason}")]
    CorruptStore {
        /// Path of the store file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// Labels and predictions differ in length.
    #[error("got {labels} labels but {predictions} predictions")]
    LengthMismatch {
        /// Number of labels.
        labels: usize,
        /// Number of predictions.
        predictions: usize,
    },

    /// Metrics were requested over zero documents.
    #[error("cannot evaluate an empty set of predictions")]
    EmptyEvaluation,

    /// The model directory could not be loaded.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The model inference failed.
    #[error("inference error: {0}")]
    Inference(String),

    /// Candle ML framework error.
    #[error("ML inference error: {0}")]
    Candle(String),
}

/// Result type alias for doccat operations.
pub type Result<T> = std::result::Result<T, DoccatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = DoccatError::EmptyEvaluation;
        assert_eq!(err.to_string(), "cannot evaluate an empty set of predictions");

        let err = DoccatError::UnknownCategory {
            label: "weather".into(),
            row: Some(3),
        };
        assert_eq!(err.to_string(), "unknown category \"weather\" at row 3");

        let err = DoccatError::UnknownCategory {
            label: "weather".into(),
            row: None,
        };
        assert_eq!(err.to_string(), "unknown category \"weather\"");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DoccatError>();
    }
}
