//! Short-lived cache for the most recently decoded frame.
//!
//! Providers decode at most once per `cache_timeout`: repeated `get_frame`
//! calls inside one capture tick reuse the same frame.

use tokio::time::Instant;

use super::frame_utils::convert_format;
use super::types::{Frame, FrameRequest};

#[derive(Debug, Default)]
pub struct FrameCache {
    cached: Option<(Instant, Frame)>,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached frame if it is fresh, else decode a new one.
    ///
    /// The result is converted to `request.format`. A decode that yields
    /// `None` leaves the cache untouched.
    pub fn get_or_decode<F>(&mut self, request: &FrameRequest, decode: F) -> Option<Frame>
    where
        F: FnOnce() -> Option<Frame>,
    {
        if let Some((decoded_at, frame)) = &self.cached {
            if decoded_at.elapsed() < request.cache_timeout && frame.format == request.format {
                return Some(frame.clone());
            }
        }

        let frame = convert_format(&decode()?, request.format);
        self.cached = Some((Instant::now(), frame.clone()));
        Some(frame)
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
