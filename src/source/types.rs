//! Frame source types and data structures.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// The two interchangeable camera backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Host webcam (browser/OS video device)
    Webcam,
    /// External camera-module peripheral
    CameraModule,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Webcam => "webcam",
            SourceKind::CameraModule => "camera-module",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webcam" => Ok(SourceKind::Webcam),
            "camera-module" | "cameramodule" | "camera_module" => Ok(SourceKind::CameraModule),
            other => Err(SourceError::UnknownKind(other.to_string())),
        }
    }
}

/// Pixel format of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// RGB format (3 bytes per pixel)
    Rgb,
    /// RGBA format (4 bytes per pixel), the layout of a canvas image buffer
    Rgba,
}

impl FrameFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Rgb => 3,
            FrameFormat::Rgba => 4,
        }
    }
}

/// A captured camera frame or an imported sample image.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data, row-major
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
    /// When the frame was captured or decoded
    pub timestamp: Instant,
}

impl Frame {
    /// Build an RGBA frame from raw pixels.
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let frame = Self {
            data,
            width,
            height,
            format: FrameFormat::Rgba,
            timestamp: Instant::now(),
        };
        frame.is_well_formed().then_some(frame)
    }

    /// A zero-filled RGBA frame.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * 4],
            width,
            height,
            format: FrameFormat::Rgba,
            timestamp: Instant::now(),
        }
    }

    /// Get the number of bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Whether `data` holds exactly `width * height` pixels.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize * self.bytes_per_pixel()
    }
}

/// Options for a single `get_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    /// Desired pixel layout
    pub format: FrameFormat,
    /// Reuse a decoded frame younger than this instead of decoding a new one
    pub cache_timeout: Duration,
}

impl FrameRequest {
    pub fn new(format: FrameFormat, cache_timeout: Duration) -> Self {
        Self {
            format,
            cache_timeout,
        }
    }
}

/// Errors reported by a frame source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera device disconnected")]
    Disconnected,

    #[error("failed to open camera: {0}")]
    OpenFailed(String),

    #[error("no frames available: {0}")]
    NoFrames(String),

    #[error("unknown source type '{0}' (expected webcam or camera-module)")]
    UnknownKind(String),
}
