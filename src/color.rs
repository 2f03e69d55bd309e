//! RGB888 ↔ RGB565 conversion.
//!
//! Both directions use integer multiply-add-shift rounding, so the results
//! are bit-exact across platforms. The round trip is lossy: red and blue
//! come back within 4 of the input, green within 2.

/// Size of one RGB565 sample on disk.
pub(crate) const RGB565_SIZE: usize = 2;

/// Quantize an 8-bit RGB triple to RGB565.
#[inline]
pub fn rgb888_to_rgb565(r: u8, g: u8, b: u8) -> u16 {
    let r = (u32::from(r) * 249 + 1014) >> 11;
    let g = (u32::from(g) * 253 + 505) >> 10;
    let b = (u32::from(b) * 249 + 1014) >> 11;
    ((r << 11) | (g << 5) | b) as u16
}

/// Expand an RGB565 value to an 8-bit RGB triple.
#[inline]
pub fn rgb565_to_rgb888(v: u16) -> [u8; 3] {
    let v = u32::from(v);
    let r = (((v & 0xF800) >> 11) * 527 + 23) >> 6;
    let g = (((v & 0x07E0) >> 5) * 259 + 33) >> 6;
    let b = ((v & 0x001F) * 527 + 23) >> 6;
    [r as u8, g as u8, b as u8]
}
