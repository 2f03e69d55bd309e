//! Packed payload decoder.
//!
//! A packed payload addresses a virtual screen `scan_line_length` pixels
//! wide. It is a `u16` chunk count minus one, followed by chunks of
//!
//! ```text
//! screen_offset u16   bytes of black to skip (two per pixel)
//! run_minus_one u16   color run length minus one
//! run * u16           RGB565 pixels
//! ```
//!
//! The image is the top-left `width x height` window of that screen.
//! Packed payloads are only ever read; the encoder writes raw payloads.

use alloc::vec::Vec;
use enough::Stop;

use crate::color::rgb565_to_rgb888;
use crate::cursor::Cursor;
use crate::error::TrsError;
use crate::header::ImageHeader;
use crate::limits::Limits;

const PIXEL_SIZE: usize = 3;

/// Apply a chunk's screen offset to the running line position.
///
/// Returns `(pixels to skip, new pixels_recorded)`. An offset larger than a
/// whole scan line carries the pixels already recorded on the current line
/// into the skip and restarts the count; any other offset just moves along
/// the line.
pub(crate) fn advance_position(
    scan_line_length: usize,
    pixels_recorded: usize,
    screen_offset: usize,
) -> (usize, usize) {
    if screen_offset > scan_line_length {
        (screen_offset + pixels_recorded, 0)
    } else {
        (screen_offset, pixels_recorded + screen_offset)
    }
}

/// Zero-initialized RGB8 working screen.
///
/// Starts at `scan_line_length * height` pixels and grows on demand.
/// Pixels past `visible_end` can never land in the output window, so writes
/// there are dropped instead of growing the buffer.
struct ScanLineBuffer<'l> {
    buf: Vec<u8>,
    /// Write position in pixels.
    pos: usize,
    /// One past the last pixel any output row reads.
    visible_end: usize,
    limits: Option<&'l Limits>,
}

impl<'l> ScanLineBuffer<'l> {
    fn new(
        scan_line_length: usize,
        width: usize,
        height: usize,
        limits: Option<&'l Limits>,
    ) -> Result<Self, TrsError> {
        let initial = scan_line_length * height;
        let visible_end = (height - 1) * scan_line_length + width;
        let mut screen = Self {
            buf: Vec::new(),
            pos: 0,
            visible_end: visible_end.max(initial),
            limits,
        };
        screen.grow_to(initial)?;
        Ok(screen)
    }

    /// Grow to hold at least `pixels`, zero-filling new space.
    fn grow_to(&mut self, pixels: usize) -> Result<(), TrsError> {
        let bytes = pixels * PIXEL_SIZE;
        if bytes > self.buf.len() {
            if let Some(limits) = self.limits {
                limits.check_memory(bytes)?;
            }
            self.buf.resize(bytes, 0);
        }
        Ok(())
    }

    fn skip(&mut self, pixels: usize) -> Result<(), TrsError> {
        self.pos = self
            .pos
            .checked_add(pixels)
            .ok_or_else(|| TrsError::LimitExceeded("packed screen position overflow".into()))?;
        Ok(())
    }

    /// Read `run` RGB565 pixels from `cursor` and store them at the write
    /// position.
    fn write_run(&mut self, cursor: &mut Cursor<'_>, run: usize) -> Result<(), TrsError> {
        let end = self.pos.saturating_add(run);
        self.grow_to(end.min(self.visible_end))?;

        for i in 0..run {
            let v = cursor.read_u16_be()?;
            let px = self.pos + i;
            if px < self.visible_end {
                let off = px * PIXEL_SIZE;
                self.buf[off..off + PIXEL_SIZE].copy_from_slice(&rgb565_to_rgb888(v));
            }
        }
        if end > self.visible_end {
            log::trace!(
                "dropped {} pixels outside the visible screen",
                end - self.pos.max(self.visible_end)
            );
        }
        self.pos = end;
        Ok(())
    }

    /// Cut the `width`-pixel left edge of each of `height` scan lines.
    fn into_image(
        mut self,
        scan_line_length: usize,
        width: usize,
        height: usize,
    ) -> Result<Vec<u8>, TrsError> {
        self.grow_to(self.visible_end)?;
        let row_bytes = width * PIXEL_SIZE;
        let mut out = Vec::with_capacity(row_bytes * height);
        for row in 0..height {
            let start = row * scan_line_length * PIXEL_SIZE;
            out.extend_from_slice(&self.buf[start..start + row_bytes]);
        }
        Ok(out)
    }
}

/// Decode the packed payload at `offset` into RGB8 pixels.
pub(crate) fn decode_packed(
    data: &[u8],
    offset: u32,
    scan_line_length: u16,
    header: &ImageHeader,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<Vec<u8>, TrsError> {
    if scan_line_length == 0 {
        return Err(TrsError::InvalidHeader(
            "packed payload with a zero scan line length".into(),
        ));
    }
    let line = usize::from(scan_line_length);
    let w = header.width as usize;
    let h = header.height as usize;

    let mut cursor = Cursor::at(data, offset as usize)?;
    let chunk_count = usize::from(cursor.read_u16_be()?) + 1;
    log::trace!("packed payload at {offset}: {chunk_count} chunks, scan line {line}");

    let mut screen = ScanLineBuffer::new(line, w, h, limits)?;
    let mut pixels_recorded = 0usize;

    for chunk_idx in 0..chunk_count {
        if chunk_idx % 1024 == 0 {
            stop.check()?;
        }
        let screen_offset = usize::from(cursor.read_u16_be()?) / 2;
        let run = usize::from(cursor.read_u16_be()?) + 1;

        let (skip, recorded) = advance_position(line, pixels_recorded, screen_offset);
        screen.skip(skip)?;
        screen.write_run(&mut cursor, run)?;
        pixels_recorded = recorded.saturating_add(run);
    }

    screen.into_image(line, w, h)
}
