//! Unpacked payload: `width * height` big-endian RGB565 values, row-major.

use alloc::vec::Vec;
use enough::Stop;

use crate::color::{RGB565_SIZE, rgb565_to_rgb888, rgb888_to_rgb565};
use crate::cursor::Cursor;
use crate::error::TrsError;
use crate::header::ImageHeader;

/// Append `height` rows of RGB8 pixels to `out` as RGB565. `stride` is the
/// row pitch of `pixels` in pixels.
pub(crate) fn encode_raw(
    pixels: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    out: &mut Vec<u8>,
    stop: &dyn Stop,
) -> Result<(), TrsError> {
    out.reserve(width * height * RGB565_SIZE);
    for row_idx in 0..height {
        if row_idx % 16 == 0 {
            stop.check()?;
        }
        let start = row_idx * stride * 3;
        let row = &pixels[start..start + width * 3];
        for px in row.chunks_exact(3) {
            let v = rgb888_to_rgb565(px[0], px[1], px[2]);
            out.extend_from_slice(&v.to_be_bytes());
        }
    }
    Ok(())
}

/// Decode the unpacked payload at `offset` into RGB8 pixels.
pub(crate) fn decode_raw(
    data: &[u8],
    offset: u32,
    header: &ImageHeader,
    stop: &dyn Stop,
) -> Result<Vec<u8>, TrsError> {
    let w = header.width as usize;
    let mut cursor = Cursor::at(data, offset as usize)?;
    let mut out = Vec::with_capacity(header.pixel_count() * 3);

    for row_idx in 0..header.height as usize {
        if row_idx % 16 == 0 {
            stop.check()?;
        }
        for _ in 0..w {
            let v = cursor.read_u16_be()?;
            out.extend_from_slice(&rgb565_to_rgb888(v));
        }
    }

    Ok(out)
}
