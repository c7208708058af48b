//! The capability set every format codec implements.
//!
//! The dispatcher only ever talks to `dyn Codec`. A codec never sees another
//! codec, never picks its own probe order, and allocates pixel memory only
//! through the [`DecodeContext`] it is handed.

use enough::Stop;

use crate::config::EncoderOptions;
use crate::error::{Result, ResultExt};
use crate::format::ImageFormat;
use crate::image::Image;
use crate::limits::Limits;
use crate::pixel::{PixelFormat, PixelStorage};
use crate::stream::Stream;

/// A format codec: identify, detect, decode, encode.
///
/// Implementations must be stateless (or internally synchronized) so the
/// built-in registry can be shared across threads.
pub trait Codec: Send + Sync {
    /// Stable format identifier.
    fn format(&self) -> ImageFormat;

    /// Whether the stream starts with this format's signature.
    ///
    /// Reads only a fixed-size header and may leave the stream at any
    /// position. A stream too short to hold the signature is `Ok(false)`.
    fn detect(&self, stream: &mut Stream<'_>) -> Result<bool>;

    /// Decode a whole image. The stream is positioned at 0 on entry.
    fn decode(&self, ctx: &DecodeContext<'_>, stream: &mut Stream<'_>) -> Result<Image>;

    /// Encode `image` starting at the stream's current position.
    ///
    /// Must fail with [`ImageError::InvalidData`](crate::ImageError::InvalidData)
    /// for an empty image.
    fn encode(&self, ctx: &EncodeContext<'_>, stream: &mut Stream<'_>, image: &Image)
    -> Result<()>;
}

impl core::fmt::Debug for dyn Codec + '_ {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Codec").field(&self.format()).finish()
    }
}

/// Allocation and cancellation handle passed to [`Codec::decode`].
pub struct DecodeContext<'a> {
    limits: &'a Limits,
    stop: &'a dyn Stop,
}

impl<'a> DecodeContext<'a> {
    pub fn new(limits: &'a Limits, stop: &'a dyn Stop) -> Self {
        Self { limits, stop }
    }

    pub fn limits(&self) -> &Limits {
        self.limits
    }

    pub fn stop(&self) -> &dyn Stop {
        self.stop
    }

    /// Fail with [`ImageError::Cancelled`](crate::ImageError::Cancelled)
    /// if the caller asked to stop.
    pub fn check_stop(&self) -> Result<()> {
        self.stop.check().or_at()
    }

    /// Check image dimensions and frame count against the limits before any
    /// allocation happens.
    pub fn check_header(&self, width: u64, height: u64, frames: u64) -> Result<()> {
        self.limits.check_dimensions(width, height)?;
        self.limits.check_frames(frames)
    }

    /// Allocate zero-filled storage for a `width × height` frame.
    ///
    /// Enforces the limits and reports allocator failure as
    /// [`ImageError::OutOfMemory`](crate::ImageError::OutOfMemory).
    pub fn alloc_pixels(
        &self,
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<PixelStorage> {
        self.limits.check_dimensions(width as u64, height as u64)?;
        let count = width
            .checked_mul(height)
            .ok_or_else(|| whereat::at(crate::ImageError::OutOfMemory))?;
        let bytes = format
            .byte_size(count)
            .ok_or_else(|| whereat::at(crate::ImageError::OutOfMemory))?;
        self.limits.check_memory(bytes as u64)?;
        PixelStorage::new(format, count)
    }
}

/// Options and cancellation handle passed to [`Codec::encode`].
pub struct EncodeContext<'a> {
    options: &'a EncoderOptions,
    stop: &'a dyn Stop,
}

impl<'a> EncodeContext<'a> {
    pub fn new(options: &'a EncoderOptions, stop: &'a dyn Stop) -> Self {
        Self { options, stop }
    }

    pub fn options(&self) -> &EncoderOptions {
        self.options
    }

    pub fn stop(&self) -> &dyn Stop {
        self.stop
    }

    /// Fail with [`ImageError::Cancelled`](crate::ImageError::Cancelled)
    /// if the caller asked to stop.
    pub fn check_stop(&self) -> Result<()> {
        self.stop.check().or_at()
    }
}
