/// Pixel memory layout of a raster handed to or returned by the codec.
///
/// Only [`PixelLayout::Rgb8`] can be stored in a container; the other
/// layouts exist so callers can pass whatever their raster codec produced
/// and get a [`crate::TrsError::ChannelMismatch`] back.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// Single channel, 8-bit grayscale.
    Gray8,
    /// 2 channels, 8-bit grayscale + alpha.
    GrayAlpha8,
    /// 3 channels, 8-bit RGB.
    Rgb8,
    /// 4 channels, 8-bit RGBA.
    Rgba8,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels()
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::GrayAlpha8 => 2,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}
