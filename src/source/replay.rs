//! Replay provider: serves pre-decoded images as a live camera feed.
//!
//! Used wherever no physical device is available (the `record` command,
//! tests). Frames are served round-robin; a new frame is only advanced to
//! once the previous one has aged past the request's `cache_timeout`.

use std::path::Path;

use super::cache::FrameCache;
use super::frame_utils::mirror_horizontal;
use super::provider::{FrameProvider, ProviderSink};
use super::types::{Frame, FrameRequest, SourceError, SourceKind};
use crate::archive::decode_sample;

/// Image file extensions picked up by [`load_frames_from_dir`].
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

pub struct ReplayProvider {
    kind: SourceKind,
    frames: Vec<Frame>,
    cursor: usize,
    mirror: bool,
    enabled: bool,
    cache: FrameCache,
    decoded: usize,
}

impl ReplayProvider {
    pub fn new(kind: SourceKind, frames: Vec<Frame>) -> Self {
        Self {
            kind,
            frames,
            cursor: 0,
            mirror: false,
            enabled: false,
            cache: FrameCache::new(),
            decoded: 0,
        }
    }

    /// Flip frames horizontally (selfie mode).
    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    /// Number of frames actually pulled from the replay list (cache misses).
    pub fn decoded_count(&self) -> usize {
        self.decoded
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl FrameProvider for ReplayProvider {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn enable(&mut self, sink: ProviderSink) {
        if self.frames.is_empty() {
            sink.error(SourceError::NoFrames("replay list is empty".to_string()));
            return;
        }
        self.enabled = true;
        sink.access_granted();
        sink.ready();
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.cache.invalidate();
    }

    fn get_frame(&mut self, request: &FrameRequest) -> Option<Frame> {
        if !self.enabled {
            return None;
        }

        let frames = &self.frames;
        let cursor = &mut self.cursor;
        let decoded = &mut self.decoded;
        let mirror = self.mirror;
        self.cache.get_or_decode(request, || {
            let mut frame = frames.get(*cursor % frames.len())?.clone();
            *cursor = (*cursor + 1) % frames.len();
            *decoded += 1;
            if mirror {
                mirror_horizontal(&mut frame);
            }
            Some(frame)
        })
    }
}

/// Decode every image file in `dir`, in file-name order.
///
/// Unreadable or undecodable files are logged and skipped.
pub fn load_frames_from_dir(dir: &Path) -> Result<Vec<Frame>, SourceError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| SourceError::OpenFailed(format!("{}: {}", dir.display(), e)))?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        match decode_sample(&bytes) {
            Ok(frame) => frames.push(frame),
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    if frames.is_empty() {
        return Err(SourceError::NoFrames(dir.display().to_string()));
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::provider::ProviderEventKind;
    use crate::source::types::FrameFormat;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn solid(value: u8) -> Frame {
        Frame::rgba(1, 1, vec![value, value, value, 255]).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_frames_once_cache_expires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut provider = ReplayProvider::new(SourceKind::Webcam, vec![solid(1), solid(2)]);
        provider.enable(ProviderSink::new(1, tx));
        assert_eq!(rx.try_recv().unwrap().kind, ProviderEventKind::AccessGranted);
        assert_eq!(rx.try_recv().unwrap().kind, ProviderEventKind::Ready);

        let request = FrameRequest::new(FrameFormat::Rgba, Duration::from_millis(10));
        assert_eq!(provider.get_frame(&request).unwrap().data[0], 1);
        assert_eq!(provider.get_frame(&request).unwrap().data[0], 1);
        tokio::time::advance(Duration::from_millis(10)).await;
        assert_eq!(provider.get_frame(&request).unwrap().data[0], 2);
        tokio::time::advance(Duration::from_millis(10)).await;
        assert_eq!(provider.get_frame(&request).unwrap().data[0], 1);
        assert_eq!(provider.decoded_count(), 3);
    }

    #[test]
    fn test_empty_replay_reports_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut provider = ReplayProvider::new(SourceKind::CameraModule, Vec::new());
        provider.enable(ProviderSink::new(3, tx));
        let event = rx.try_recv().unwrap();
        assert_eq!(event.generation, 3);
        assert!(matches!(
            event.kind,
            ProviderEventKind::Error(SourceError::NoFrames(_))
        ));
        assert!(!provider.is_enabled());
    }

    #[test]
    fn test_disabled_provider_returns_none() {
        let mut provider = ReplayProvider::new(SourceKind::Webcam, vec![solid(5)]);
        let request = FrameRequest::new(FrameFormat::Rgba, Duration::ZERO);
        assert!(provider.get_frame(&request).is_none());
    }

    #[test]
    fn test_load_frames_from_missing_dir_fails() {
        let result = load_frames_from_dir(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(SourceError::OpenFailed(_))));
    }

    #[test]
    fn test_load_frames_from_dir_skips_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 10, 10]));
        img.save(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        std::fs::write(dir.path().join("broken.jpg"), b"not a jpeg").unwrap();

        let frames = load_frames_from_dir(dir.path()).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].width, 2);
        assert_eq!(frames[0].format, FrameFormat::Rgba);
    }
}
