//! Restore a label store from a collection archive.

use std::io::{Cursor, Read, Seek};

use futures_util::future::join_all;
use zip::ZipArchive;

use super::image_codec::decode_sample;
use super::manifest::{collect_dataset, ManifestRecord};
use super::naming::{is_image_entry, SampleName};
use super::{FORMAT_VERSION, MANIFEST_ENTRY};
use crate::source::Frame;
use crate::store::{LabelStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("not a readable archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive has no classifier.collection.json")]
    MissingManifest,

    #[error("failed to read manifest: {0}")]
    ManifestRead(#[from] std::io::Error),

    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("manifest lists {records} classes but the store has {slots} slots")]
    TooManyClasses { records: usize, slots: usize },

    #[error("dataset entry references class {class_id} outside {slots} slots")]
    DatasetOutOfRange { class_id: usize, slots: usize },

    #[error("failed to apply manifest: {0}")]
    Store(#[from] StoreError),
}

/// An archive entry that could not be imported.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Records in the manifest.
    pub classes: usize,
    /// Records that enabled their class slot.
    pub enabled: usize,
    pub samples: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Apply an archive to `store`.
///
/// The manifest is parsed and validated before anything is touched, so a
/// bad manifest leaves the store unchanged. Image entries are decoded
/// concurrently; an entry that fails to read, decode or append is skipped
/// and listed in the report.
pub async fn import_collection(
    store: &dyn LabelStore,
    bytes: Vec<u8>,
) -> Result<ImportReport, ImportError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let records = read_manifest(&mut archive)?;
    validate(&records, store.classes().len())?;

    let mut report = ImportReport {
        classes: records.len(),
        ..Default::default()
    };
    for (index, record) in records.iter().enumerate() {
        if record.version != FORMAT_VERSION {
            log::warn!(
                "Class {} written by format {}; reading as {}",
                index,
                record.version,
                FORMAT_VERSION
            );
        }
        if record.enable {
            store.add_class(index)?;
            store.rename(index, &record.name)?;
            report.enabled += 1;
        }
        store.set_result_name(index, record.result.name.as_deref())?;
    }
    store.set_classifier_dataset(collect_dataset(&records))?;

    let entries = read_sample_entries(&mut archive, &mut report.skipped);
    let decoded = join_all(entries.into_iter().map(|(name, raw)| async move {
        let result = tokio::task::spawn_blocking(move || decode_sample(&raw))
            .await
            .map_err(|e| e.to_string())
            .and_then(|decoded| decoded.map_err(|e| e.to_string()));
        (name, result)
    }))
    .await;

    let mut frames: Vec<(SampleName, Frame)> = Vec::new();
    for (name, result) in decoded {
        match result {
            Ok(frame) => frames.push((name, frame)),
            Err(reason) => skip(&mut report.skipped, name.to_string(), reason),
        }
    }
    frames.sort_by_key(|(name, _)| name.order_key());

    for (name, frame) in frames {
        match store.add_example(frame, name.class_index) {
            Ok(()) => report.samples += 1,
            Err(e) => skip(&mut report.skipped, name.to_string(), e.to_string()),
        }
    }

    log::info!(
        "Imported {} classes ({} enabled), {} samples, {} skipped",
        report.classes,
        report.enabled,
        report.samples,
        report.skipped.len()
    );
    Ok(report)
}

pub(super) fn read_manifest<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<ManifestRecord>, ImportError> {
    let mut file = match archive.by_name(MANIFEST_ENTRY) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Err(ImportError::MissingManifest),
        Err(e) => return Err(e.into()),
    };
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok(serde_json::from_str(&text)?)
}

fn validate(records: &[ManifestRecord], slots: usize) -> Result<(), ImportError> {
    if records.len() > slots {
        return Err(ImportError::TooManyClasses {
            records: records.len(),
            slots,
        });
    }
    for entry in collect_dataset(records) {
        if entry.class_id >= slots {
            return Err(ImportError::DatasetOutOfRange {
                class_id: entry.class_id,
                slots,
            });
        }
    }
    Ok(())
}

/// Raw bytes of every sample-named entry, in archive order.
fn read_sample_entries(
    archive: &mut ZipArchive<Cursor<Vec<u8>>>,
    skipped: &mut Vec<SkippedEntry>,
) -> Vec<(SampleName, Vec<u8>)> {
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = match archive.by_index(i) {
            Ok(file) => file,
            Err(e) => {
                skip(skipped, format!("entry #{}", i), e.to_string());
                continue;
            }
        };
        let entry = file.name().to_string();
        let Some(name) = SampleName::parse(&entry) else {
            if is_image_entry(&entry) {
                skip(skipped, entry, "not a <class>-<sample> image name".to_string());
            } else if entry != MANIFEST_ENTRY && !file.is_dir() {
                log::debug!("Ignoring archive entry {}", entry);
            }
            continue;
        };
        let mut raw = Vec::new();
        match file.read_to_end(&mut raw) {
            Ok(_) => entries.push((name, raw)),
            Err(e) => skip(skipped, entry, e.to_string()),
        }
    }
    entries
}

fn skip(skipped: &mut Vec<SkippedEntry>, name: String, reason: String) {
    log::warn!("Skipping {}: {}", name, reason);
    skipped.push(SkippedEntry { name, reason });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLabelStore;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[tokio::test]
    async fn test_missing_manifest_is_fatal() {
        let store = MemoryLabelStore::new(2);
        let bytes = build(&[("0-0.jpg", &b"whatever"[..])]);
        let err = import_collection(&store, bytes).await.unwrap_err();
        assert!(matches!(err, ImportError::MissingManifest));
    }

    #[tokio::test]
    async fn test_not_a_zip_is_fatal() {
        let store = MemoryLabelStore::new(2);
        let err = import_collection(&store, b"plain text".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Zip(_)));
    }

    #[tokio::test]
    async fn test_corrupt_manifest_leaves_store_untouched() {
        let store = MemoryLabelStore::new(2);
        let bytes = build(&[(MANIFEST_ENTRY, &b"[{\"name\": \"a\", \"enable\": tru"[..])]);
        let err = import_collection(&store, bytes).await.unwrap_err();
        assert!(matches!(err, ImportError::Manifest(_)));
        assert!(store.classes().iter().all(|c| !c.enabled));
    }

    #[tokio::test]
    async fn test_oversized_manifest_is_rejected_before_applying() {
        let store = MemoryLabelStore::new(1);
        let manifest = br#"[
            {"name": "a", "enable": true, "version": "1.0.0", "result": {"name": null}},
            {"name": "b", "enable": true, "version": "1.0.0", "result": {"name": null}}
        ]"#;
        let err = import_collection(&store, build(&[(MANIFEST_ENTRY, &manifest[..])]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::TooManyClasses {
                records: 2,
                slots: 1
            }
        ));
        assert!(!store.classes()[0].enabled);
    }

    #[tokio::test]
    async fn test_samples_for_disabled_class_are_skipped() {
        let store = MemoryLabelStore::new(2);
        let manifest = br#"[
            {"name": "a", "enable": false, "version": "1.0.0", "result": {"name": null}}
        ]"#;
        let mut png = Vec::new();
        image::RgbaImage::new(2, 2)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let report = import_collection(
            &store,
            build(&[
                (MANIFEST_ENTRY, &manifest[..]),
                ("0-0.png", &png[..]),
                ("notes.txt", &b"hi"[..]),
            ]),
        )
        .await
        .unwrap();
        assert_eq!(report.samples, 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "0-0.png");
    }

    #[tokio::test]
    async fn test_unparseable_image_name_is_reported() {
        let store = MemoryLabelStore::new(1);
        let manifest = br#"[
            {"name": "a", "enable": true, "version": "1.0.0", "result": {"name": null}}
        ]"#;
        let report = import_collection(
            &store,
            build(&[
                (MANIFEST_ENTRY, &manifest[..]),
                ("0-99999999999999999999.jpg", &b"unused"[..]),
                ("readme.md", &b"hi"[..]),
            ]),
        )
        .await
        .unwrap();
        assert_eq!(report.samples, 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "0-99999999999999999999.jpg");
        assert_eq!(store.example_count(0), 0);
    }
}
