//! Resource limits applied while decoding.

use whereat::at;

use crate::error::Result;
use crate::ImageError;

/// Resource limits for decode operations.
///
/// Guards against hostile headers that declare huge dimensions. All limits
/// are optional; the default imposes none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u64>,
    /// Maximum image height in pixels.
    pub max_height: Option<u64>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes of decoded pixels. Bounds every allocation, and for an
    /// animation all decoded frames together.
    pub max_memory_bytes: Option<u64>,
    /// Maximum number of animation frames.
    pub max_frames: Option<u64>,
}

impl Limits {
    /// No restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_max_width(mut self, max: u64) -> Self {
        self.max_width = Some(max);
        self
    }

    pub fn with_max_height(mut self, max: u64) -> Self {
        self.max_height = Some(max);
        self
    }

    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    pub fn with_max_memory_bytes(mut self, max: u64) -> Self {
        self.max_memory_bytes = Some(max);
        self
    }

    pub fn with_max_frames(mut self, max: u64) -> Self {
        self.max_frames = Some(max);
        self
    }

    /// Check dimensions against the width, height and pixel limits.
    pub fn check_dimensions(&self, width: u64, height: u64) -> Result<()> {
        if self.max_width.is_some_and(|max| width > max) {
            return Err(at(ImageError::LimitExceeded("width exceeds limit")));
        }
        if self.max_height.is_some_and(|max| height > max) {
            return Err(at(ImageError::LimitExceeded("height exceeds limit")));
        }
        if self
            .max_pixels
            .is_some_and(|max| width.saturating_mul(height) > max)
        {
            return Err(at(ImageError::LimitExceeded("pixel count exceeds limit")));
        }
        Ok(())
    }

    /// Check a single allocation size.
    pub fn check_memory(&self, bytes: u64) -> Result<()> {
        if self.max_memory_bytes.is_some_and(|max| bytes > max) {
            return Err(at(ImageError::LimitExceeded(
                "memory allocation exceeds limit",
            )));
        }
        Ok(())
    }

    /// Check a frame count.
    pub fn check_frames(&self, frames: u64) -> Result<()> {
        if self.max_frames.is_some_and(|max| frames > max) {
            return Err(at(ImageError::LimitExceeded("frame count exceeds limit")));
        }
        Ok(())
    }
}
