//! # zentrs
//!
//! Decoder and encoder for TRS image containers.
//!
//! A TRS container holds up to 65535 small images (each side 1..=256) in
//! 16-bit RGB565. Each image is stored either as a raw ("unpacked") pixel
//! array or as a "packed" stream of run-length chunks laid out on scan lines
//! that may be wider than the image.
//!
//! ## Supported
//!
//! - Decode of version 2 and 3 containers, unpacked and packed payloads
//! - Encode of version 3 containers with unpacked payloads
//! - Header probing without pixel decoding ([`ContainerInfo`])
//!
//! ## Non-Goals
//!
//! - Alpha channels
//! - Writing packed payloads
//! - Editing an existing container in place, or streaming
//!
//! ## Usage
//!
//! ```
//! use zentrs::{DecodeRequest, EncodeRequest, PixelLayout, Unstoppable};
//!
//! let white = [255u8; 3 * 3 * 3];
//! let trs = EncodeRequest::new()
//!     .add_image(&white, 3, 3, PixelLayout::Rgb8)
//!     .encode(Unstoppable)?;
//!
//! let images = DecodeRequest::new(&trs).decode(Unstoppable)?;
//! assert_eq!(images.len(), 1);
//! assert_eq!((images[0].width, images[0].height), (3, 3));
//! assert_eq!(images[0].pixels(), &white[..]);
//! # Ok::<(), zentrs::TrsError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod color;
mod cursor;
mod error;
mod header;
mod info;
mod limits;
mod packed;
mod pixel;
mod raw;

mod decode;
mod encode;

#[cfg(feature = "std")]
pub mod fs;

// Re-exports
pub use color::{rgb565_to_rgb888, rgb888_to_rgb565};
pub use decode::{DecodeRequest, DecodedImage};
pub use encode::{EncodeRequest, SourceImage};
pub use enough::{Stop, Unstoppable};
pub use error::{ErrorKind, TrsError};
pub use header::{
    ContainerHeader, HEADER_SIZE, IMAGE_HEADER_SIZE, ImageHeader, MAX_DIMENSION, PayloadKind,
    TRS_MAGIC, header_section_size,
};
pub use info::ContainerInfo;
pub use limits::Limits;
pub use pixel::PixelLayout;

/// Decode every image of a container, stopping at the first failure.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<alloc::vec::Vec<DecodedImage>, TrsError> {
    DecodeRequest::new(data).decode(stop)
}

/// Encode RGB8 images (`pixels`, `width`, `height`) into a container.
pub fn encode_rgb8(
    images: &[(&[u8], u32, u32)],
    stop: impl Stop,
) -> Result<alloc::vec::Vec<u8>, TrsError> {
    images
        .iter()
        .fold(EncodeRequest::new(), |req, &(pixels, w, h)| {
            req.add_image(pixels, w, h, PixelLayout::Rgb8)
        })
        .encode(stop)
}
