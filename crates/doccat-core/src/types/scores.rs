use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::error::{DoccatError, Result};

/// The top-scoring category of a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted category.
    pub cat: Category,
    /// Score the categorizer assigned to it.
    pub score: f32,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.cat, self.score)
    }
}

/// Per-category scores whose keys are exactly [`Category::ALL`].
///
/// Gold annotations are stored as `1.0` for the true category and `0.0`
/// elsewhere; categorizer output holds probabilities. Iteration always
/// follows the canonical category order.
///
/// Serialized as a named map; a score JSON cannot represent (NaN or an
/// infinity) is written as `null` and read back as NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Category, Option<f32>>",
    into = "BTreeMap<Category, Option<f32>>"
)]
pub struct CategoryScores([f32; Category::COUNT]);

impl CategoryScores {
    /// All-zero mapping.
    #[must_use]
    pub fn zeros() -> Self {
        Self([0.0; Category::COUNT])
    }

    /// Gold mapping with `label` flagged true.
    #[must_use]
    pub fn one_hot(label: Category) -> Self {
        let mut scores = Self::zeros();
        scores.0[label.index()] = 1.0;
        scores
    }

    /// Builds a mapping from `(category, score)` pairs covering every category once.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Category, f32)>,
    {
        let mut values = [0.0; Category::COUNT];
        let mut seen = [false; Category::COUNT];

        for (cat, score) in pairs {
            let idx = cat.index();
            if seen[idx] {
                return Err(DoccatError::CategoryMismatch(format!(
                    "category {cat} given more than once"
                )));
            }
            seen[idx] = true;
            values[idx] = score;
        }

        if let Some(missing) = Category::ALL.iter().find(|c| !seen[c.index()]) {
            return Err(DoccatError::CategoryMismatch(format!(
                "category {missing} has no score"
            )));
        }

        Ok(Self(values))
    }

    /// Score of a single category.
    #[must_use]
    pub fn get(&self, cat: Category) -> f32 {
        self.0[cat.index()]
    }

    /// Sets the score of a single category.
    pub fn set(&mut self, cat: Category, score: f32) {
        self.0[cat.index()] = score;
    }

    /// `(category, score)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f32)> + '_ {
        Category::ALL.iter().map(move |&c| (c, self.0[c.index()]))
    }

    /// The maximum-scoring category.
    ///
    /// Ties go to the category encountered first; a NaN never beats a number.
    #[must_use]
    pub fn top(&self) -> Prediction {
        let mut best = Prediction {
            cat: Category::ALL[0],
            score: self.0[0],
        };
        for (cat, score) in self.iter().skip(1) {
            if score > best.score || (best.score.is_nan() && !score.is_nan()) {
                best = Prediction { cat, score };
            }
        }
        best
    }

    /// The single category flagged true (non-zero).
    ///
    /// Returns `None` unless exactly one flag is set; see
    /// [`CategoryScores::true_count`] for the number of flags.
    #[must_use]
    pub fn true_label(&self) -> Option<Category> {
        let mut flagged = self.iter().filter(|(_, s)| *s != 0.0).map(|(c, _)| c);
        match (flagged.next(), flagged.next()) {
            (Some(cat), None) => Some(cat),
            _ => None,
        }
    }

    /// Number of categories flagged true.
    #[must_use]
    pub fn true_count(&self) -> usize {
        self.0.iter().filter(|s| **s != 0.0).count()
    }
}

impl TryFrom<BTreeMap<Category, Option<f32>>> for CategoryScores {
    type Error = DoccatError;

    fn try_from(map: BTreeMap<Category, Option<f32>>) -> Result<Self> {
        Self::from_pairs(
            map.into_iter()
                .map(|(cat, score)| (cat, score.unwrap_or(f32::NAN))),
        )
    }
}

impl From<CategoryScores> for BTreeMap<Category, Option<f32>> {
    fn from(scores: CategoryScores) -> Self {
        scores
            .iter()
            .map(|(cat, score)| (cat, score.is_finite().then_some(score)))
            .collect()
    }
}
