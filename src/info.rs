use alloc::vec::Vec;

use crate::error::TrsError;
use crate::header::{ContainerHeader, ImageHeader};

/// Container metadata obtained by probing headers, without decoding pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerInfo {
    pub header: ContainerHeader,
    /// One entry per image, in table order.
    pub images: Vec<ImageHeader>,
}

impl ContainerInfo {
    /// Parse the file header and the whole image header table.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TrsError> {
        let header = ContainerHeader::parse(data)?;
        let images = (0..usize::from(header.image_count))
            .map(|index| ImageHeader::parse(data, index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { header, images })
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Container version (2 or 3).
    pub fn version(&self) -> u16 {
        self.header.version
    }
}
