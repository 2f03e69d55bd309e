use alloc::vec::Vec;

use enough::Stop;
#[cfg(feature = "imgref")]
use rgb::ComponentBytes as _;

use crate::color::RGB565_SIZE;
use crate::error::TrsError;
use crate::header::{ContainerHeader, ImageHeader, MAX_DIMENSION, header_section_size};
use crate::limits::Limits;
use crate::pixel::PixelLayout;
use crate::raw;

/// An input raster borrowed by an [`EncodeRequest`].
#[derive(Clone, Copy, Debug)]
pub struct SourceImage<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Distance between row starts, in pixels.
    pub stride: usize,
    pub layout: PixelLayout,
}

/// Builder for encoding images into a TRS container.
///
/// Every image is validated and every payload offset computed before the
/// first output byte is produced, and the container is returned as one
/// buffer, so a failed encode never yields partial output.
///
/// # Example
///
/// ```
/// use zentrs::{EncodeRequest, PixelLayout, Unstoppable};
///
/// let black = [0u8; 2 * 2 * 3];
/// let trs = EncodeRequest::new()
///     .add_image(&black, 2, 2, PixelLayout::Rgb8)
///     .encode(Unstoppable)?;
/// assert_eq!(&trs[..4], b"TCSF");
/// # Ok::<(), zentrs::TrsError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct EncodeRequest<'a> {
    images: Vec<SourceImage<'a>>,
    limits: Option<&'a Limits>,
}

impl<'a> EncodeRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an image. Only [`PixelLayout::Rgb8`] encodes; other layouts
    /// are rejected by [`encode`](Self::encode).
    pub fn add_image(
        mut self,
        pixels: &'a [u8],
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Self {
        self.images.push(SourceImage {
            pixels,
            width,
            height,
            stride: width as usize,
            layout,
        });
        self
    }

    /// Append an image from an [`imgref::ImgRef`] of RGB8 pixels.
    #[cfg(feature = "imgref")]
    pub fn add_imgref(mut self, img: imgref::ImgRef<'a, rgb::RGB8>) -> Self {
        let width = img.width() as u32;
        let height = img.height() as u32;
        let stride = img.stride();
        self.images.push(SourceImage {
            pixels: img.into_buf().as_bytes(),
            width,
            height,
            stride,
            layout: PixelLayout::Rgb8,
        });
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Produce the container bytes.
    pub fn encode(&self, stop: impl Stop) -> Result<Vec<u8>, TrsError> {
        let count = self.images.len();
        if count == 0 {
            return Err(TrsError::NoImages);
        }
        let image_count = u16::try_from(count).map_err(|_| TrsError::TooManyImages(count))?;
        if let Some(limits) = self.limits {
            limits.check_images(count)?;
        }

        let header_size = header_section_size(count);
        let mut headers = Vec::with_capacity(count);
        let mut pixels_before = 0u64;

        for (index, image) in self.images.iter().enumerate() {
            stop.check()?;
            validate(index, image)?;

            let offset = header_size as u64 + RGB565_SIZE as u64 * pixels_before;
            let offset = u32::try_from(offset)
                .map_err(|_| TrsError::OffsetOverflow { index, offset })?;
            headers.push(ImageHeader::unpacked(image.width, image.height, offset));

            pixels_before += u64::from(image.width) * u64::from(image.height);
            if let Some(limits) = self.limits {
                limits.check_pixels(pixels_before)?;
            }
        }

        let total = header_size as u64 + RGB565_SIZE as u64 * pixels_before;
        let total = usize::try_from(total)
            .map_err(|_| TrsError::LimitExceeded(alloc::format!("container of {total} bytes")))?;
        if let Some(limits) = self.limits {
            limits.check_memory(total)?;
        }

        let mut out = Vec::with_capacity(total);
        ContainerHeader::for_encode(image_count).write(&mut out);
        for header in &headers {
            header.write(&mut out);
        }
        for (image, header) in self.images.iter().zip(&headers) {
            debug_assert_eq!(out.len(), header.unpacked_offset as usize);
            raw::encode_raw(
                image.pixels,
                image.width as usize,
                image.height as usize,
                image.stride,
                &mut out,
                &stop,
            )?;
        }

        log::debug!("encoded {count} images into {} bytes", out.len());
        Ok(out)
    }
}

/// Channels, then dimensions, then buffer size.
fn validate(index: usize, image: &SourceImage<'_>) -> Result<(), TrsError> {
    let channels = image.layout.channels();
    if channels != 3 {
        return Err(TrsError::ChannelMismatch { index, channels });
    }

    let (width, height) = (image.width, image.height);
    if !(1..=MAX_DIMENSION).contains(&width) || !(1..=MAX_DIMENSION).contains(&height) {
        return Err(TrsError::InvalidDimensions {
            index,
            width,
            height,
        });
    }

    let needed = ((height as usize - 1) * image.stride + width as usize)
        * image.layout.bytes_per_pixel();
    if image.pixels.len() < needed {
        return Err(TrsError::BufferTooSmall {
            index,
            needed,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}
