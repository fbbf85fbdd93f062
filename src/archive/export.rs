//! Serialize a label store into a collection archive.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use futures_util::future::try_join_all;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::image_codec::{encode_sample, SampleError};
use super::manifest::build_manifest;
use super::naming::SampleName;
use super::{
    ARCHIVE_EXTENSION, ARCHIVE_MIME_TYPE, COMPRESSION_LEVEL, DEFAULT_FILE_NAME,
    DEFAULT_JPEG_QUALITY, MANIFEST_ENTRY,
};
use crate::store::{LabelStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to read label store: {0}")]
    Store(#[from] StoreError),

    #[error("label store returned {classes} classes but {results} results")]
    Mismatch { classes: usize, results: usize },

    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("failed to encode {entry}: {source}")]
    Encode {
        entry: String,
        #[source]
        source: SampleError,
    },

    #[error("encoder task failed: {0}")]
    Task(String),

    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub jpeg_quality: u8,
    pub compression_level: i64,
    pub file_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            compression_level: COMPRESSION_LEVEL,
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

/// A finished archive ready to hand to an [`ExportSink`].
#[derive(Debug, Clone)]
pub struct ExportedArchive {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// Where an exported archive ends up.
pub trait ExportSink {
    fn deliver(&self, archive: &ExportedArchive) -> Result<PathBuf, ExportError>;
}

/// Writes archives into a directory under their suggested file name.
#[derive(Debug, Clone)]
pub struct FileExportSink {
    dir: PathBuf,
}

impl FileExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for FileExportSink {
    fn deliver(&self, archive: &ExportedArchive) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&archive.file_name);
        std::fs::write(&path, &archive.bytes)?;
        log::info!("Wrote {} ({} bytes)", path.display(), archive.bytes.len());
        Ok(path)
    }
}

/// Ensure `name` carries the collection extension.
pub fn archive_file_name(name: &str) -> String {
    let suffix = format!(".{}", ARCHIVE_EXTENSION);
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

/// Build a collection archive from the store's current state.
///
/// Samples are JPEG-encoded concurrently; one failed encode fails the whole
/// export and nothing is produced.
pub async fn export_collection(
    store: &dyn LabelStore,
    options: &ExportOptions,
) -> Result<ExportedArchive, ExportError> {
    let dataset = store.classifier_dataset().await?;
    let classes = store.classes();
    let results = store.results();
    if classes.len() != results.len() {
        return Err(ExportError::Mismatch {
            classes: classes.len(),
            results: results.len(),
        });
    }

    let manifest = serde_json::to_vec(&build_manifest(&classes, &results, dataset))?;

    let quality = options.jpeg_quality;
    let mut jobs = Vec::new();
    for (class_index, class) in classes.into_iter().enumerate() {
        for (sample_index, frame) in class.examples.into_iter().enumerate() {
            let name = SampleName::jpeg(class_index, sample_index).to_string();
            jobs.push(async move {
                let encoded = tokio::task::spawn_blocking(move || encode_sample(&frame, quality))
                    .await
                    .map_err(|e| ExportError::Task(e.to_string()))?;
                match encoded {
                    Ok(bytes) => Ok((name, bytes)),
                    Err(source) => Err(ExportError::Encode {
                        entry: name,
                        source,
                    }),
                }
            });
        }
    }
    let samples = try_join_all(jobs).await?;
    log::debug!("Encoded {} samples", samples.len());

    let bytes = write_archive(&manifest, &samples, options.compression_level)?;
    log::info!(
        "Exported {} samples into {} bytes",
        samples.len(),
        bytes.len()
    );

    Ok(ExportedArchive {
        bytes,
        file_name: archive_file_name(&options.file_name),
        mime_type: ARCHIVE_MIME_TYPE,
    })
}

fn write_archive(
    manifest: &[u8],
    samples: &[(String, Vec<u8>)],
    level: i64,
) -> Result<Vec<u8>, ExportError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(MANIFEST_ENTRY, options)?;
    zip.write_all(manifest)?;
    for (name, bytes) in samples {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(bytes)?;
    }
    Ok(zip.finish()?.into_inner())
}
