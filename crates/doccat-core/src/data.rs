//! # Input Data
//!
//! Reads the tab-separated source file of labeled articles. Every row
//! needs `title`, `text` and `category` columns; anything else in the
//! header is ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{DoccatError, Result};
use crate::types::{Category, RawRecord};

#[derive(Debug, Deserialize)]
struct InputRow {
    title: String,
    text: String,
    category: String,
}

/// Load labeled records from a TSV file.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = read_records(BufReader::new(file))?;
    info!(path = %path.display(), records = records.len(), "loaded input data");
    Ok(records)
}

/// Read labeled records from any TSV stream with a header row.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut tsv = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, row) in tsv.deserialize::<InputRow>().enumerate() {
        let row = row?;
        let label = row
            .category
            .parse::<Category>()
            .map_err(|_| DoccatError::UnknownCategory {
                label: row.category.clone(),
                row: Some(idx + 1),
            })?;
        records.push(RawRecord::new(format!("{} {}", row.title, row.text), label));
    }

    debug!(records = records.len(), "parsed TSV rows");
    Ok(records)
}

/// Number of records per category, in canonical category order.
#[must_use]
pub fn category_counts(records: &[RawRecord]) -> [usize; Category::COUNT] {
    let mut counts = [0usize; Category::COUNT];
    for record in records {
        counts[record.label.index()] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "url\ttitle\ttext\tcategory\n\
        http://a.example/1\tCup final\tThe home side won.\tsports\n\
        http://b.example/2\tNew phone\t\"Ships with a \"\"fast\"\" chip\"\ttechnology_science\n";

    #[test]
    fn reads_and_joins_title_and_text() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "Cup final The home side won.");
        assert_eq!(records[0].label, Category::Sports);
        assert_eq!(records[1].text, "New phone Ships with a \"fast\" chip");
        assert_eq!(records[1].label, Category::TechnologyScience);
    }

    #[test]
    fn unknown_category_reports_row() {
        let input = "title\ttext\tcategory\na\tb\tnews\nc\td\tweather\n";
        match read_records(input.as_bytes()) {
            Err(DoccatError::UnknownCategory { label, row }) => {
                assert_eq!(label, "weather");
                assert_eq!(row, Some(2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_malformed() {
        let input = "title\tcategory\na\tnews\n";
        assert!(matches!(
            read_records(input.as_bytes()),
            Err(DoccatError::Tsv(_))
        ));
    }

    #[test]
    fn header_only_yields_no_records() {
        let records = read_records("title\ttext\tcategory\n".as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn counts_follow_category_order() {
        let records = vec![
            RawRecord::new("a", Category::News),
            RawRecord::new("b", Category::News),
            RawRecord::new("c", Category::TechnologyScience),
        ];
        let counts = category_counts(&records);
        assert_eq!(counts[Category::News.index()], 2);
        assert_eq!(counts[0], 1);
        assert_eq!(counts.iter().sum::<usize>(), 3);
    }
}
