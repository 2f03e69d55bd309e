use alloc::vec::Vec;

use enough::Stop;
#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::error::TrsError;
use crate::header::{ContainerHeader, ImageHeader, PayloadKind};
use crate::limits::Limits;
use crate::pixel::PixelLayout;
use crate::{packed, raw};

/// One decoded image of a container: owned RGB8 pixels, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pixels: Vec<u8>,
    /// Position in the container's image table.
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// Payload the pixels were decoded from.
    pub payload: PayloadKind,
}

impl DecodedImage {
    /// Access the pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the pixel data.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Always [`PixelLayout::Rgb8`].
    pub fn layout(&self) -> PixelLayout {
        PixelLayout::Rgb8
    }

    /// Reinterpret pixel data as a typed RGB8 slice.
    #[cfg(feature = "rgb")]
    pub fn as_pixels(&self) -> &[rgb::RGB8] {
        self.pixels.as_slice().as_pixels()
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of RGB8 pixels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> imgref::ImgRef<'_, rgb::RGB8> {
        imgref::ImgRef::new(
            self.as_pixels(),
            self.width as usize,
            self.height as usize,
        )
    }

    /// Convert to an [`imgref::ImgVec`] of RGB8 pixels.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec(&self) -> imgref::ImgVec<rgb::RGB8> {
        imgref::ImgVec::new(
            self.as_pixels().to_vec(),
            self.width as usize,
            self.height as usize,
        )
    }
}

/// Builder for decoding a TRS container held in memory.
///
/// [`decode`](Self::decode) stops at the first image that fails.
/// [`decode_each`](Self::decode_each) keeps going and reports a result per
/// image; container-level problems (magic, version, truncated file header)
/// still fail the whole call.
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, limits: None }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Decode every image, aborting on the first failure.
    pub fn decode(&self, stop: impl Stop) -> Result<Vec<DecodedImage>, TrsError> {
        let header = self.container_header()?;
        let mut images = Vec::with_capacity(usize::from(header.image_count));
        let mut total_pixels = 0u64;
        for index in 0..usize::from(header.image_count) {
            let image = self.decode_at(&header, index, total_pixels, &stop)?;
            total_pixels += u64::from(image.width) * u64::from(image.height);
            images.push(image);
        }
        Ok(images)
    }

    /// Decode every image independently, collecting one result per image.
    pub fn decode_each(
        &self,
        stop: impl Stop,
    ) -> Result<Vec<Result<DecodedImage, TrsError>>, TrsError> {
        let header = self.container_header()?;
        let mut results = Vec::with_capacity(usize::from(header.image_count));
        for index in 0..usize::from(header.image_count) {
            match self.decode_at(&header, index, 0, &stop) {
                // cancellation is not a per-image failure
                Err(TrsError::Cancelled(reason)) => return Err(TrsError::Cancelled(reason)),
                Err(e) => {
                    log::warn!("skipping image #{index}: {e}");
                    results.push(Err(e));
                }
                Ok(image) => results.push(Ok(image)),
            }
        }
        Ok(results)
    }

    /// Decode the single image at `index`.
    pub fn decode_image(&self, index: usize, stop: impl Stop) -> Result<DecodedImage, TrsError> {
        let header = self.container_header()?;
        let count = usize::from(header.image_count);
        if index >= count {
            return Err(TrsError::IndexOutOfRange { index, count });
        }
        self.decode_at(&header, index, 0, &stop)
    }

    fn container_header(&self) -> Result<ContainerHeader, TrsError> {
        let header = ContainerHeader::parse(self.data)?;
        if let Some(limits) = self.limits {
            limits.check_images(usize::from(header.image_count))?;
        }
        Ok(header)
    }

    /// Decode image `index`. `pixels_before` counts the pixels already
    /// decoded by this call, so the total-pixel limit is enforced before
    /// any payload is read.
    fn decode_at(
        &self,
        container: &ContainerHeader,
        index: usize,
        pixels_before: u64,
        stop: &dyn Stop,
    ) -> Result<DecodedImage, TrsError> {
        stop.check()?;
        let header = ImageHeader::parse(self.data, index)?;
        let payload = header.payload().ok_or(TrsError::MissingPayload { index })?;
        if let Some(limits) = self.limits {
            limits.check_pixels(pixels_before + header.pixel_count() as u64)?;
            limits.check_memory(header.pixel_count() * PixelLayout::Rgb8.bytes_per_pixel())?;
        }

        log::debug!(
            "image #{index}: {}x{} {:?}",
            header.width,
            header.height,
            payload
        );

        let pixels = match payload {
            PayloadKind::Unpacked(offset) => raw::decode_raw(self.data, offset, &header, stop),
            PayloadKind::Packed(offset) => packed::decode_packed(
                self.data,
                offset,
                container.scan_line_length,
                &header,
                self.limits,
                stop,
            ),
        }
        .map_err(|e| e.in_payload(index))?;

        Ok(DecodedImage {
            pixels,
            index,
            width: header.width,
            height: header.height,
            payload,
        })
    }
}
