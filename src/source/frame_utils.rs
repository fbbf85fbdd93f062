//! Frame conversion and transformation utilities.

use super::types::{Frame, FrameFormat};

/// Convert a frame to the requested pixel format.
///
/// RGB to RGBA fills alpha with 255; RGBA to RGB drops alpha.
pub fn convert_format(frame: &Frame, format: FrameFormat) -> Frame {
    let data = match (frame.format, format) {
        (FrameFormat::Rgb, FrameFormat::Rgba) => frame
            .data
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        (FrameFormat::Rgba, FrameFormat::Rgb) => frame
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        _ => frame.data.clone(),
    };

    Frame {
        data,
        width: frame.width,
        height: frame.height,
        format,
        timestamp: frame.timestamp,
    }
}

/// Flip a frame left to right, for front-facing cameras.
pub fn mirror_horizontal(frame: &mut Frame) {
    let bpp = frame.bytes_per_pixel();
    let width = frame.width as usize;
    let stride = width * bpp;
    if stride == 0 {
        return;
    }
    for row in frame.data.chunks_exact_mut(stride) {
        let mut pixels: Vec<[u8; 4]> = Vec::with_capacity(width);
        for px in row.chunks_exact(bpp) {
            let mut buf = [0u8; 4];
            buf[..bpp].copy_from_slice(px);
            pixels.push(buf);
        }
        for (dst, src) in row.chunks_exact_mut(bpp).zip(pixels.iter().rev()) {
            dst.copy_from_slice(&src[..bpp]);
        }
    }
}

/// Zero every byte of the frame, keeping its dimensions.
pub fn blank_fill(frame: &mut Frame) {
    frame.data.iter_mut().for_each(|b| *b = 0);
}
