//! Live preview surface.

use crate::source::{blank_fill, convert_format, Frame, FrameFormat};

/// Receives frames for the live preview.
pub trait PreviewSink: Send {
    /// Whether the preview is already fed by another path (for example the
    /// stage camera is on), in which case the capture loop skips it.
    fn is_ready(&self) -> bool;

    /// Replace the displayed image with `frame`.
    fn show(&mut self, frame: &Frame);

    /// Fill the displayed image with zeroes.
    fn blank(&mut self);
}

/// In-memory canvas used as the default preview surface.
#[derive(Debug)]
pub struct PreviewBuffer {
    canvas: Frame,
    stage_active: bool,
    shown: u64,
}

impl PreviewBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Frame::blank(width, height),
            stage_active: false,
            shown: 0,
        }
    }

    /// Mark the stage camera as feeding the preview.
    pub fn set_stage_active(&mut self, active: bool) {
        self.stage_active = active;
    }

    pub fn canvas(&self) -> &Frame {
        &self.canvas
    }

    /// Number of frames shown since construction.
    pub fn frames_shown(&self) -> u64 {
        self.shown
    }

    pub fn is_blank(&self) -> bool {
        self.canvas.data.iter().all(|b| *b == 0)
    }
}

impl PreviewSink for PreviewBuffer {
    fn is_ready(&self) -> bool {
        self.stage_active
    }

    fn show(&mut self, frame: &Frame) {
        self.canvas = convert_format(frame, FrameFormat::Rgba);
        self.shown += 1;
    }

    fn blank(&mut self) {
        blank_fill(&mut self.canvas);
    }
}
