use alloc::string::String;
use enough::StopReason;

/// Errors from TRS container decoding and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TrsError {
    #[error("unrecognized format magic bytes, this is not a TRS container")]
    UnrecognizedFormat,

    #[error("unsupported TRS version {0} (expected 2 or 3)")]
    UnsupportedVersion(u16),

    #[error("image #{index}: dimensions {width}x{height} outside 1..=256")]
    InvalidDimensions { index: usize, width: u32, height: u32 },

    #[error("image #{index}: both packed and unpacked payload offsets are zero")]
    MissingPayload { index: usize },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("no images to encode")]
    NoImages,

    #[error("too many images: {0} (a container holds at most 65535)")]
    TooManyImages(usize),

    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    #[error("image #{index}: payload truncated at byte {offset}")]
    PayloadTruncated { index: usize, offset: usize },

    #[error("image #{index}: has {channels} color channels, exactly 3 are required")]
    ChannelMismatch { index: usize, channels: usize },

    #[error("image #{index}: payload offset {offset} exceeds the 32-bit offset field")]
    OffsetOverflow { index: usize, offset: u64 },

    #[error("image #{index}: buffer too small, need {needed} bytes, got {actual}")]
    BufferTooSmall {
        index: usize,
        needed: usize,
        actual: usize,
    },

    #[error("image index {index} out of range (container has {count} images)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),

    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`TrsError`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or unsupported container layout, or invalid input dimensions.
    Format,
    /// Short read while parsing headers or payloads.
    Truncated,
    /// Input raster does not have exactly 3 channels.
    ChannelMismatch,
    /// A computed payload offset does not fit the on-disk field.
    OffsetOverflow,
    /// Underlying stream failure.
    Io,
    /// Limits, cancellation, and caller misuse.
    Other,
}

impl TrsError {
    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnrecognizedFormat
            | Self::UnsupportedVersion(_)
            | Self::InvalidDimensions { .. }
            | Self::MissingPayload { .. }
            | Self::InvalidHeader(_)
            | Self::NoImages
            | Self::TooManyImages(_) => ErrorKind::Format,
            Self::UnexpectedEof { .. } | Self::PayloadTruncated { .. } => ErrorKind::Truncated,
            Self::ChannelMismatch { .. } => ErrorKind::ChannelMismatch,
            Self::OffsetOverflow { .. } => ErrorKind::OffsetOverflow,
            #[cfg(feature = "std")]
            Self::Io(_) => ErrorKind::Io,
            Self::BufferTooSmall { .. }
            | Self::IndexOutOfRange { .. }
            | Self::LimitExceeded(_)
            | Self::Cancelled(_) => ErrorKind::Other,
        }
    }

    /// Attribute a short read to the payload of image `index`.
    pub(crate) fn in_payload(self, index: usize) -> Self {
        match self {
            Self::UnexpectedEof { offset } => Self::PayloadTruncated { index, offset },
            other => other,
        }
    }
}

impl From<StopReason> for TrsError {
    fn from(r: StopReason) -> Self {
        TrsError::Cancelled(r)
    }
}
