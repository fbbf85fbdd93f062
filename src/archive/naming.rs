//! Sample entry names: `<classIndex>-<sampleIndex>.<ext>`.

use std::fmt;

use super::SAMPLE_EXTENSION;

/// Image extensions recognised on import (case-insensitive).
const IMPORT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Whether `entry` is a top-level file with an image extension, whether or
/// not its stem is a valid sample name.
pub fn is_image_entry(entry: &str) -> bool {
    if entry.contains('/') || entry.contains('\\') {
        return false;
    }
    entry.rsplit_once('.').is_some_and(|(_, extension)| {
        IMPORT_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleName {
    pub class_index: usize,
    pub sample_index: usize,
    pub extension: String,
}

impl SampleName {
    /// Name used on export.
    pub fn jpeg(class_index: usize, sample_index: usize) -> Self {
        Self {
            class_index,
            sample_index,
            extension: SAMPLE_EXTENSION.to_string(),
        }
    }

    /// Parse an archive entry name. Returns `None` for anything that is not
    /// a top-level sample image.
    pub fn parse(entry: &str) -> Option<Self> {
        if !is_image_entry(entry) {
            return None;
        }
        let (stem, extension) = entry.rsplit_once('.')?;
        let (class, sample) = stem.rsplit_once('-')?;
        Some(Self {
            class_index: class.parse().ok()?,
            sample_index: sample.parse().ok()?,
            extension: extension.to_string(),
        })
    }

    /// Sort key that restores export order.
    pub fn order_key(&self) -> (usize, usize) {
        (self.class_index, self.sample_index)
    }
}

impl fmt::Display for SampleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}.{}", self.class_index, self.sample_index, self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_name_format() {
        assert_eq!(SampleName::jpeg(0, 12).to_string(), "0-12.jpg");
    }

    #[test]
    fn test_parse_accepts_known_extensions() {
        let name = SampleName::parse("3-7.JPEG").unwrap();
        assert_eq!(name.order_key(), (3, 7));
        assert!(SampleName::parse("10-0.png").is_some());
    }

    #[test]
    fn test_parse_rejects_other_entries() {
        for entry in [
            "classifier.collection.json",
            "0-1.svg",
            "a-1.jpg",
            "0-b.jpg",
            "01.jpg",
            "nested/0-1.jpg",
            "0-1",
        ] {
            assert_eq!(SampleName::parse(entry), None, "{entry}");
        }
    }

    #[test]
    fn test_overflowing_index_is_an_image_but_not_a_sample() {
        let entry = "0-99999999999999999999.jpg";
        assert!(is_image_entry(entry));
        assert_eq!(SampleName::parse(entry), None);
        assert!(!is_image_entry("notes.txt"));
        assert!(!is_image_entry("nested/0-1.png"));
    }
}
