use serde::{Deserialize, Serialize};

use super::category::Category;
use super::scores::{CategoryScores, Prediction};
use crate::error::{DoccatError, Result};

/// A raw labeled record: title and body joined by a space, plus its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub text: String,
    pub label: Category,
}

impl RawRecord {
    pub fn new(text: impl Into<String>, label: Category) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// A unit of input text with its gold category mapping and, after
/// inference, the categorizer's scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Position of the document in its collection.
    pub id: usize,

    /// Document text.
    pub text: String,

    /// Gold annotation: exactly one category flagged true.
    pub cats: CategoryScores,

    /// Categorizer output, filled in by [`crate::predict::predict`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted: Option<CategoryScores>,
}

impl Document {
    /// Creates a gold document from a raw record.
    #[must_use]
    pub fn from_record(id: usize, record: &RawRecord) -> Self {
        Self {
            id,
            text: record.text.clone(),
            cats: CategoryScores::one_hot(record.label),
            predicted: None,
        }
    }

    /// The single category flagged true in the gold annotation.
    pub fn true_label(&self) -> Result<Category> {
        self.cats
            .true_label()
            .ok_or(DoccatError::InvalidGoldLabels {
                id: self.id,
                count: self.cats.true_count(),
            })
    }

    /// Top category of the stored prediction, if inference has run.
    #[must_use]
    pub fn predicted_top(&self) -> Option<Prediction> {
        self.predicted.as_ref().map(CategoryScores::top)
    }
}
