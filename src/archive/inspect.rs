//! Read-only summary of a collection archive.

use std::collections::BTreeMap;
use std::io::Cursor;

use sha2::{Digest, Sha256};
use zip::ZipArchive;

use super::import::{read_manifest, ImportError};
use super::manifest::ManifestRecord;
use super::naming::SampleName;
use super::MANIFEST_ENTRY;

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveSummary {
    /// Hex SHA-256 of the whole archive.
    pub sha256: String,
    pub records: Vec<ManifestRecord>,
    /// Sample entries per class index.
    pub samples: BTreeMap<usize, usize>,
    /// Entries that are neither the manifest nor a sample.
    pub other_entries: Vec<String>,
}

impl ArchiveSummary {
    pub fn sample_count(&self, class_index: usize) -> usize {
        self.samples.get(&class_index).copied().unwrap_or(0)
    }
}

/// Parse the manifest and count sample entries without decoding any image.
pub fn summarize(bytes: &[u8]) -> Result<ArchiveSummary, ImportError> {
    let sha256 = hex::encode(Sha256::digest(bytes));
    let mut archive = ZipArchive::new(Cursor::new(bytes.to_vec()))?;
    let records = read_manifest(&mut archive)?;

    let mut samples = BTreeMap::new();
    let mut other_entries = Vec::new();
    for name in archive.file_names() {
        match SampleName::parse(name) {
            Some(sample) => *samples.entry(sample.class_index).or_insert(0) += 1,
            None if name == MANIFEST_ENTRY => {}
            None => other_entries.push(name.to_string()),
        }
    }
    other_entries.sort();

    Ok(ArchiveSummary {
        sha256,
        records,
        samples,
        other_entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{export_collection, ExportOptions};
    use crate::source::Frame;
    use crate::store::{LabelStore, MemoryLabelStore};

    #[tokio::test]
    async fn test_summary_counts_samples_per_class() {
        let store = MemoryLabelStore::new(3);
        store.add_class(0).unwrap();
        store.add_class(2).unwrap();
        for _ in 0..2 {
            store.add_example(Frame::blank(2, 2), 2).unwrap();
        }
        store.add_example(Frame::blank(2, 2), 0).unwrap();

        let archive = export_collection(&store, &ExportOptions::default())
            .await
            .unwrap();
        let summary = summarize(&archive.bytes).unwrap();

        assert_eq!(summary.records.len(), 3);
        assert_eq!(summary.sample_count(0), 1);
        assert_eq!(summary.sample_count(1), 0);
        assert_eq!(summary.sample_count(2), 2);
        assert!(summary.other_entries.is_empty());
        assert_eq!(summary.sha256.len(), 64);
        assert_eq!(summary.sha256, hex::encode(Sha256::digest(&archive.bytes)));
    }
}
