//! Collection archive codec.
//!
//! A collection is a zip with one `classifier.collection.json` manifest and
//! one JPEG per sample named `<classIndex>-<sampleIndex>.jpg`.

mod export;
mod image_codec;
mod import;
mod inspect;
mod manifest;
mod naming;

pub use export::{
    archive_file_name, export_collection, ExportError, ExportOptions, ExportSink,
    ExportedArchive, FileExportSink,
};
pub use image_codec::{decode_sample, encode_sample, SampleError};
pub use import::{import_collection, ImportError, ImportReport, SkippedEntry};
pub use inspect::{summarize, ArchiveSummary};
pub use manifest::{build_manifest, collect_dataset, ManifestRecord, ResultRecord};
pub use naming::{is_image_entry, SampleName};

/// Name of the manifest entry.
pub const MANIFEST_ENTRY: &str = "classifier.collection.json";
/// Written into every manifest record.
pub const FORMAT_VERSION: &str = "1.0.0";
pub const ARCHIVE_MIME_TYPE: &str = "application/x.scratch.sprite3";
pub const ARCHIVE_EXTENSION: &str = "ipcc";
pub const DEFAULT_FILE_NAME: &str = "classifier.ipcc";
/// DEFLATE level for every entry.
pub const COMPRESSION_LEVEL: i64 = 6;
pub const DEFAULT_JPEG_QUALITY: u8 = 92;
pub const SAMPLE_EXTENSION: &str = "jpg";
