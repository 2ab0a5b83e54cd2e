//! # Document Store
//!
//! Persisted document collections. A store file is gzip-compressed JSON
//! lines: a header line followed by one [`Document`] per line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DoccatError, Result};
use crate::types::{Document, RawRecord};

const STORE_FORMAT: &str = "doccat-docs";
const STORE_VERSION: u32 = 1;
/// Upper bound on the capacity reserved from a header count.
const PREALLOC_LIMIT: usize = 4096;

#[derive(Debug, Serialize, Deserialize)]
struct StoreHeader {
    format: String,
    version: u32,
    count: usize,
}

/// An in-memory collection of documents that can be written to and read from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocStore {
    docs: Vec<Document>,
}

impl DocStore {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    /// Gold documents for `records`, numbered by position.
    pub fn from_records(records: &[RawRecord]) -> Self {
        let docs = records
            .iter()
            .enumerate()
            .map(|(id, record)| Document::from_record(id, record))
            .collect();
        Self { docs }
    }

    pub fn docs(&self) -> &[Document] {
        &self.docs
    }

    pub fn docs_mut(&mut self) -> &mut [Document] {
        &mut self.docs
    }

    pub fn into_docs(self) -> Vec<Document> {
        self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Write the collection to `path`, creating parent directories as needed.
    pub fn to_disk<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

        let header = StoreHeader {
            format: STORE_FORMAT.to_string(),
            version: STORE_VERSION,
            count: self.docs.len(),
        };
        serde_json::to_writer(&mut encoder, &header)?;
        encoder.write_all(b"\n")?;

        for doc in &self.docs {
            serde_json::to_writer(&mut encoder, doc)?;
            encoder.write_all(b"\n")?;
        }

        encoder.finish()?.flush()?;
        info!(path = %path.display(), docs = self.docs.len(), "saved documents");
        Ok(())
    }

    /// Read a collection written by [`DocStore::to_disk`].
    pub fn from_disk<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let corrupt = |reason: String| DoccatError::CorruptStore {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path)?;
        let mut lines = BufReader::new(GzDecoder::new(BufReader::new(file))).lines();

        let header_line = lines
            .next()
            .ok_or_else(|| corrupt("missing header".into()))??;
        let header: StoreHeader = serde_json::from_str(&header_line)
            .map_err(|e| corrupt(format!("unreadable header: {e}")))?;
        if header.format != STORE_FORMAT {
            return Err(corrupt(format!("unexpected format {:?}", header.format)));
        }
        if header.version != STORE_VERSION {
            return Err(corrupt(format!("unsupported version {}", header.version)));
        }

        // The header count is untrusted until the lines are read.
        let mut docs = Vec::with_capacity(header.count.min(PREALLOC_LIMIT));
        for line in lines {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            docs.push(serde_json::from_str::<Document>(&line)?);
        }

        if docs.len() != header.count {
            return Err(corrupt(format!(
                "header promises {} documents, found {}",
                header.count,
                docs.len()
            )));
        }

        debug!(path = %path.display(), docs = docs.len(), "restored documents");
        Ok(Self { docs })
    }
}

impl From<Vec<Document>> for DocStore {
    fn from(docs: Vec<Document>) -> Self {
        Self::new(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, CategoryScores};

    fn sample_records() -> Vec<RawRecord> {
        vec![
            RawRecord::new("Cup final The home side won.", Category::Sports),
            RawRecord::new("Rates rise Markets dip.", Category::MoneyBusiness),
            RawRecord::new("Road trip Ten days on the coast.", Category::Travel),
        ]
    }

    #[test]
    fn from_records_numbers_documents() {
        let store = DocStore::from_records(&sample_records());
        assert_eq!(store.len(), 3);
        let ids: Vec<usize> = store.docs().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(store.docs()[1].true_label().unwrap(), Category::MoneyBusiness);
    }

    #[test]
    fn disk_roundtrip_keeps_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("test.docs");

        let mut store = DocStore::from_records(&sample_records());
        let mut scores = CategoryScores::zeros();
        scores.set(Category::Travel, 0.9);
        store.docs_mut()[2].predicted = Some(scores);
        store.to_disk(&path).unwrap();

        let restored = DocStore::from_disk(&path).unwrap();
        assert_eq!(restored, store);
    }

    #[test]
    fn nan_prediction_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nan.docs");

        let mut store = DocStore::from_records(&sample_records());
        let mut scores = CategoryScores::zeros();
        scores.set(Category::Sports, f32::NAN);
        scores.set(Category::News, 0.6);
        store.docs_mut()[0].predicted = Some(scores);
        store.to_disk(&path).unwrap();

        let restored = DocStore::from_disk(&path).unwrap();
        let predicted = restored.docs()[0].predicted.unwrap();
        assert!(predicted.get(Category::Sports).is_nan());
        assert_eq!(predicted.top().cat, Category::News);
    }

    #[test]
    fn empty_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docs");
        DocStore::default().to_disk(&path).unwrap();
        assert!(DocStore::from_disk(&path).unwrap().is_empty());
    }

    #[test]
    fn count_mismatch_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.docs");

        let file = File::create(&path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        writeln!(enc, r#"{{"format":"doccat-docs","version":1,"count":2}}"#).unwrap();
        let doc = Document::from_record(0, &sample_records()[0]);
        writeln!(enc, "{}", serde_json::to_string(&doc).unwrap()).unwrap();
        enc.finish().unwrap();

        assert!(matches!(
            DocStore::from_disk(&path),
            Err(DoccatError::CorruptStore { .. })
        ));
    }

    #[test]
    fn huge_header_count_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.docs");

        let file = File::create(&path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        writeln!(
            enc,
            r#"{{"format":"doccat-docs","version":1,"count":18446744073709551615}}"#
        )
        .unwrap();
        enc.finish().unwrap();

        let err = DocStore::from_disk(&path).unwrap_err();
        assert!(matches!(err, DoccatError::CorruptStore { .. }));
        assert!(err.to_string().contains("found 0"));
    }

    #[test]
    fn foreign_format_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.docs");

        let file = File::create(&path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        writeln!(enc, r#"{{"format":"spans","version":1,"count":0}}"#).unwrap();
        enc.finish().unwrap();

        assert!(matches!(
            DocStore::from_disk(&path),
            Err(DoccatError::CorruptStore { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DocStore::from_disk(dir.path().join("nope.docs")),
            Err(DoccatError::Io(_))
        ));
    }
}
