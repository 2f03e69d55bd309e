//! TRS file header and per-image header table.
//!
//! ```text
//! 0   magic[4] "TCSF"
//! 4   image_count   u16
//! 6   version       u16   2 or 3
//! 8   scan_line_len u16   packed payloads only
//! 10  reserved      u16
//! 12  image_header[image_count], 12 bytes each:
//!     +0 width u8 (0 => 256)   +1 height u8 (0 => 256)   +2 reserved u16
//!     +4 unpacked_offset u32   +8 packed_offset u32      (0 => absent)
//! ```
//!
//! Every multi-byte field is big-endian.

use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::error::TrsError;

/// Four-byte tag at the start of every container.
pub const TRS_MAGIC: [u8; 4] = *b"TCSF";

/// Size of the fixed file header.
pub const HEADER_SIZE: usize = 12;

/// Size of one per-image header record.
pub const IMAGE_HEADER_SIZE: usize = 12;

/// Version written by the encoder.
pub const CURRENT_VERSION: u16 = 3;

/// Largest width or height an image may have.
pub const MAX_DIMENSION: u32 = 256;

/// Fixed file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerHeader {
    pub image_count: u16,
    pub version: u16,
    /// Pixels per physical scan line of packed payloads.
    pub scan_line_length: u16,
    pub reserved: u16,
}

impl ContainerHeader {
    /// Header the encoder emits for `image_count` raw images.
    pub(crate) fn for_encode(image_count: u16) -> Self {
        Self {
            image_count,
            version: CURRENT_VERSION,
            scan_line_length: 0,
            reserved: 0,
        }
    }

    /// Parse and validate the file header. Checks the magic tag before
    /// anything else, then the version.
    pub fn parse(data: &[u8]) -> Result<Self, TrsError> {
        let mut cursor = Cursor::new(data);
        let magic = cursor
            .read_fixed_bytes::<4>()
            .map_err(|_| TrsError::UnrecognizedFormat)?;
        if magic != TRS_MAGIC {
            return Err(TrsError::UnrecognizedFormat);
        }

        let header = Self {
            image_count: cursor.read_u16_be()?,
            version: cursor.read_u16_be()?,
            scan_line_length: cursor.read_u16_be()?,
            reserved: cursor.read_u16_be()?,
        };

        if header.version != 2 && header.version != 3 {
            return Err(TrsError::UnsupportedVersion(header.version));
        }
        if header.reserved != 0 {
            log::warn!(
                "reserved field in TRS header is not zero ({})",
                header.reserved
            );
        }
        Ok(header)
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&TRS_MAGIC);
        out.extend_from_slice(&self.image_count.to_be_bytes());
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.scan_line_length.to_be_bytes());
        out.extend_from_slice(&self.reserved.to_be_bytes());
    }
}

/// Byte size of the file header plus `image_count` image headers.
pub fn header_section_size(image_count: usize) -> usize {
    HEADER_SIZE + IMAGE_HEADER_SIZE * image_count
}

/// Where an image's pixels are stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    /// Flat RGB565 array at this file offset.
    Unpacked(u32),
    /// Scan-line chunk stream at this file offset.
    Packed(u32),
}

/// One record of the image header table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageHeader {
    /// Width in pixels, 1..=256.
    pub width: u32,
    /// Height in pixels, 1..=256.
    pub height: u32,
    pub reserved: u16,
    pub unpacked_offset: u32,
    pub packed_offset: u32,
}

impl ImageHeader {
    /// Header of a raw image whose payload starts at `offset`.
    pub(crate) fn unpacked(width: u32, height: u32, offset: u32) -> Self {
        Self {
            width,
            height,
            reserved: 0,
            unpacked_offset: offset,
            packed_offset: 0,
        }
    }

    /// Parse the header of image `index`, located by fixed-stride arithmetic.
    pub fn parse(data: &[u8], index: usize) -> Result<Self, TrsError> {
        let offset = HEADER_SIZE + IMAGE_HEADER_SIZE * index;
        let mut cursor = Cursor::at(data, offset)?;

        let header = Self {
            width: decode_dimension(cursor.read_u8()?),
            height: decode_dimension(cursor.read_u8()?),
            reserved: cursor.read_u16_be()?,
            unpacked_offset: cursor.read_u32_be()?,
            packed_offset: cursor.read_u32_be()?,
        };

        if header.reserved != 0 {
            log::warn!(
                "reserved field in image header #{index} is not zero ({})",
                header.reserved
            );
        }
        if header.payload().is_none() {
            return Err(TrsError::MissingPayload { index });
        }
        Ok(header)
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.push(encode_dimension(self.width));
        out.push(encode_dimension(self.height));
        out.extend_from_slice(&self.reserved.to_be_bytes());
        out.extend_from_slice(&self.unpacked_offset.to_be_bytes());
        out.extend_from_slice(&self.packed_offset.to_be_bytes());
    }

    /// Payload to decode. Unpacked wins when both offsets are set; `None`
    /// when neither is.
    pub fn payload(&self) -> Option<PayloadKind> {
        if self.unpacked_offset != 0 {
            Some(PayloadKind::Unpacked(self.unpacked_offset))
        } else if self.packed_offset != 0 {
            Some(PayloadKind::Packed(self.packed_offset))
        } else {
            None
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// On-disk dimension byte: 256 is stored as 0.
fn encode_dimension(value: u32) -> u8 {
    debug_assert!((1..=MAX_DIMENSION).contains(&value));
    (value % MAX_DIMENSION) as u8
}

fn decode_dimension(byte: u8) -> u32 {
    if byte == 0 {
        MAX_DIMENSION
    } else {
        u32::from(byte)
    }
}
