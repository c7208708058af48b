//! Unified error types for image I/O.

use alloc::borrow::Cow;
use alloc::boxed::Box;

use enough::StopReason;
use whereat::at;

use crate::format::ImageFormat;
use crate::pixel::PixelFormat;

/// Result type for zenio operations with location tracking.
pub type Result<T, E = whereat::At<ImageError>> = core::result::Result<T, E>;

/// Unified error type for stream, dispatch, and codec operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ImageError {
    /// No registered codec recognized the stream contents.
    #[error("unsupported image format")]
    Unsupported,

    /// No codec is registered for the requested format.
    #[error("format {0:?} has no registered codec")]
    UnsupportedFormat(ImageFormat),

    /// The codec cannot store pixels in this layout.
    #[error("format {format:?} cannot store {pixel_format:?} pixels")]
    UnsupportedPixelFormat {
        format: ImageFormat,
        pixel_format: PixelFormat,
    },

    /// Semantically invalid request or malformed input.
    #[error("invalid data: {0}")]
    InvalidData(Cow<'static, str>),

    /// The input ended before a complete structure was read.
    #[error("unexpected end of stream")]
    EndOfStream,

    /// A fixed-size output buffer is too small for the encoded image.
    #[error("no space left in output buffer")]
    NoSpaceLeft,

    /// Resource limit exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(&'static str),

    /// Allocation failure.
    #[error("out of memory")]
    OutOfMemory,

    /// Operation was cancelled via the stop token.
    #[error("operation cancelled: {0:?}")]
    Cancelled(StopReason),

    /// Underlying I/O failure (open, create, seek, read, write).
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Codec-specific failure that has no closer classification.
    #[error("codec error ({format:?}): {source}")]
    Codec {
        format: ImageFormat,
        source: Box<dyn core::error::Error + Send + Sync>,
    },
}

/// Coarse classification of [`ImageError`] variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No codec for the content, the format tag, or the pixel layout.
    Unsupported,
    /// Malformed or truncated input, or an invalid request such as encoding an empty image.
    InvalidData,
    /// Memory could not be obtained, either from the allocator or within limits.
    Allocation,
    /// Failure reported by the stream backing.
    Io,
    /// Stopped by the caller's cancellation token.
    Cancelled,
}

impl ImageError {
    /// Build an [`ImageError::InvalidData`] from a static or owned message.
    pub fn invalid_data(msg: impl Into<Cow<'static, str>>) -> Self {
        ImageError::InvalidData(msg.into())
    }

    /// Wrap a codec-specific error.
    pub fn from_codec<E>(format: ImageFormat, error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        ImageError::Codec {
            format,
            source: Box::new(error),
        }
    }

    /// Taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImageError::Unsupported
            | ImageError::UnsupportedFormat(_)
            | ImageError::UnsupportedPixelFormat { .. } => ErrorKind::Unsupported,
            ImageError::InvalidData(_) | ImageError::EndOfStream | ImageError::Codec { .. } => {
                ErrorKind::InvalidData
            }
            ImageError::OutOfMemory | ImageError::LimitExceeded(_) => ErrorKind::Allocation,
            ImageError::Io(_) | ImageError::NoSpaceLeft => ErrorKind::Io,
            ImageError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}

impl From<std::io::Error> for ImageError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::UnexpectedEof => ImageError::EndOfStream,
            std::io::ErrorKind::WriteZero => ImageError::NoSpaceLeft,
            _ => ImageError::Io(error),
        }
    }
}

impl From<StopReason> for ImageError {
    fn from(reason: StopReason) -> Self {
        ImageError::Cancelled(reason)
    }
}

impl From<alloc::collections::TryReserveError> for ImageError {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        ImageError::OutOfMemory
    }
}

/// Attach a location to any error convertible into [`ImageError`].
pub(crate) trait ResultExt<T> {
    fn or_at(self) -> Result<T>;
}

impl<T, E> ResultExt<T> for core::result::Result<T, E>
where
    ImageError: From<E>,
{
    #[track_caller]
    fn or_at(self) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(at(ImageError::from(e))),
        }
    }
}
