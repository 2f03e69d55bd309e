/// Resource limits for decode/encode operations.
///
/// All fields default to `None` (no limit).
#[derive(Clone, Debug, Default)]
pub struct Limits {
    /// Maximum number of images in one container.
    pub max_images: Option<u64>,
    /// Maximum pixel count summed over every image of a container.
    pub max_total_pixels: Option<u64>,
    /// Maximum memory bytes for a single working or output buffer.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Check an image count against limits.
    pub(crate) fn check_images(&self, count: usize) -> Result<(), crate::TrsError> {
        if let Some(max) = self.max_images {
            if count as u64 > max {
                return Err(crate::TrsError::LimitExceeded(alloc::format!(
                    "image count {count} exceeds limit {max}"
                )));
            }
        }
        Ok(())
    }

    /// Check a running pixel total against limits.
    pub(crate) fn check_pixels(&self, total: u64) -> Result<(), crate::TrsError> {
        if let Some(max_px) = self.max_total_pixels {
            if total > max_px {
                return Err(crate::TrsError::LimitExceeded(alloc::format!(
                    "pixel count {total} exceeds limit {max_px}"
                )));
            }
        }
        Ok(())
    }

    /// Check that an allocation size is within memory limits.
    pub(crate) fn check_memory(&self, bytes: usize) -> Result<(), crate::TrsError> {
        if let Some(max_mem) = self.max_memory_bytes {
            if bytes as u64 > max_mem {
                return Err(crate::TrsError::LimitExceeded(alloc::format!(
                    "allocation {bytes} bytes exceeds memory limit {max_mem}"
                )));
            }
        }
        Ok(())
    }
}
