//! JPEG encoding and image decoding for archive samples.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};

use crate::source::{convert_format, Frame, FrameFormat};

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("pixel buffer does not match {width}x{height}")]
    Malformed { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Encode a sample to JPEG. Alpha is dropped.
///
/// Each call works in its own buffers, so encodes may run concurrently.
pub fn encode_sample(frame: &Frame, quality: u8) -> Result<Vec<u8>, SampleError> {
    let malformed = || SampleError::Malformed {
        width: frame.width,
        height: frame.height,
    };
    if !frame.is_well_formed() {
        return Err(malformed());
    }

    let rgb = convert_format(frame, FrameFormat::Rgb);
    let img = RgbImage::from_raw(frame.width, frame.height, rgb.data).ok_or_else(malformed)?;

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    DynamicImage::ImageRgb8(img).write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}

/// Decode any supported image into an RGBA sample.
pub fn decode_sample(bytes: &[u8]) -> Result<Frame, SampleError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Frame::rgba(width, height, rgba.into_raw()).ok_or(SampleError::Malformed { width, height })
}
