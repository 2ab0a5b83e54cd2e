//! # Reports
//!
//! Text rendering of evaluation results for the console, plus CSV export.

use std::fmt;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::metrics::ConfusionMatrix;

/// Cell shading by share of the row, lightest first.
const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

fn shade(count: usize, row_total: usize) -> char {
    if count == 0 || row_total == 0 {
        return SHADES[0];
    }
    let share = count as f64 / row_total as f64;
    let level = (share * (SHADES.len() - 1) as f64).ceil() as usize;
    SHADES[level.clamp(1, SHADES.len() - 1)]
}

/// Shaded table of a [`ConfusionMatrix`]: rows are true categories, columns
/// predicted ones. Columns are numbered; the row labels double as the legend.
#[derive(Debug, Clone, Copy)]
pub struct ConfusionTable<'a>(pub &'a ConfusionMatrix);

impl fmt::Display for ConfusionTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cm = self.0;
        let cats = cm.categories();
        let name_width = cats.iter().map(|c| c.as_str().len()).max().unwrap_or(0);
        let count_width = cm
            .rows()
            .iter()
            .flatten()
            .map(|n| n.to_string().len())
            .max()
            .unwrap_or(1)
            .max(2);
        let row_sums = cm.row_sums();

        writeln!(f, "confusion matrix (rows: true, columns: predicted)")?;

        write!(f, "{:width$}", "", width = name_width + 5)?;
        for i in 0..cats.len() {
            write!(f, " {i:>count_width$} ")?;
        }
        writeln!(f, "{:>8}", "total")?;

        for (i, (cat, row)) in cats.iter().zip(cm.rows()).enumerate() {
            write!(f, "{i:>2}  {:<name_width$} ", cat.as_str())?;
            for &count in row {
                write!(f, " {count:>count_width$}{}", shade(count, row_sums[i]))?;
            }
            writeln!(f, "{:>8}", row_sums[i])?;
        }

        writeln!(
            f,
            "{} of {} documents on the diagonal",
            cm.correct(),
            cm.total()
        )
    }
}

/// Per-class precision, recall, F1 and support of a [`ConfusionMatrix`].
#[derive(Debug, Clone, Copy)]
pub struct ClassMetricsTable<'a>(pub &'a ConfusionMatrix);

impl fmt::Display for ClassMetricsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metrics = self.0.class_metrics();
        let name_width = metrics
            .iter()
            .map(|m| m.category.as_str().len())
            .max()
            .unwrap_or(0)
            .max("category".len());

        writeln!(
            f,
            "{:<name_width$} {:>9} {:>9} {:>9} {:>8}",
            "category", "precision", "recall", "f1", "support"
        )?;
        for m in &metrics {
            writeln!(
                f,
                "{:<name_width$} {:>9.2} {:>9.2} {:>9.2} {:>8}",
                m.category.as_str(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        Ok(())
    }
}

/// Render the matrix as a shaded table, see [`ConfusionTable`].
pub fn render_confusion_matrix(cm: &ConfusionMatrix) -> String {
    ConfusionTable(cm).to_string()
}

/// Render per-class precision, recall, F1 and support.
pub fn render_class_metrics(cm: &ConfusionMatrix) -> String {
    ClassMetricsTable(cm).to_string()
}

/// Write the matrix as CSV: a header of predicted categories, one row per true category.
pub fn write_confusion_csv<P: AsRef<Path>>(path: P, cm: &ConfusionMatrix) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["true\\predicted".to_string()];
    header.extend(cm.categories().iter().map(|c| c.to_string()));
    writer.write_record(&header)?;

    for (cat, row) in cm.categories().iter().zip(cm.rows()) {
        let mut record = vec![cat.to_string()];
        record.extend(row.iter().map(|n| n.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), "wrote confusion matrix");
    Ok(())
}
