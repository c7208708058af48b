//! The [`Image`] entity: dimensions plus a single buffer, an animation, or
//! nothing.

use alloc::format;

use whereat::at;

use crate::animation::Animation;
use crate::error::Result;
use crate::pixel::{PixelFormat, PixelIter, PixelStorage};
use crate::ImageError;

/// Pixel payload of an [`Image`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ImageData {
    /// No pixels. Valid for queries, rejected by every write path.
    #[default]
    Empty,
    /// One still buffer of `width * height` pixels.
    Single(PixelStorage),
    /// Frames of `width * height` pixels each.
    Animation(Animation),
}

/// Decoded or constructed image.
///
/// Owns its pixel memory; dropping the image releases every buffer. When the
/// payload is not [`ImageData::Empty`], `width * height` equals the pixel
/// count of the buffer and of every animation frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    width: usize,
    height: usize,
    data: ImageData,
}

fn pixel_count(width: usize, height: usize) -> Result<usize> {
    width.checked_mul(height).ok_or_else(|| {
        at(ImageError::invalid_data(format!(
            "dimensions {width}x{height} overflow"
        )))
    })
}

impl Image {
    /// Image with zero-filled pixels of the given format.
    pub fn create(width: usize, height: usize, pixel_format: PixelFormat) -> Result<Self> {
        let pixels = PixelStorage::new(pixel_format, pixel_count(width, height)?)?;
        Ok(Self {
            width,
            height,
            data: ImageData::Single(pixels),
        })
    }

    /// Image holding a copy of interleaved `bytes`.
    ///
    /// `bytes.len()` must equal `width * height * bytes_per_pixel`.
    pub fn from_raw_pixels(
        width: usize,
        height: usize,
        bytes: &[u8],
        pixel_format: PixelFormat,
    ) -> Result<Self> {
        let expected = pixel_format
            .byte_size(pixel_count(width, height)?)
            .ok_or_else(|| at(ImageError::OutOfMemory))?;
        if bytes.len() != expected {
            return Err(at(ImageError::invalid_data(format!(
                "expected {expected} bytes for {width}x{height} {pixel_format:?}, got {}",
                bytes.len()
            ))));
        }
        Self::from_pixels(width, height, PixelStorage::from_bytes(pixel_format, bytes)?)
    }

    /// Image owning an existing buffer.
    pub fn from_pixels(width: usize, height: usize, pixels: PixelStorage) -> Result<Self> {
        let count = pixel_count(width, height)?;
        if pixels.len() != count {
            return Err(at(ImageError::invalid_data(format!(
                "buffer holds {} pixels, {width}x{height} needs {count}",
                pixels.len()
            ))));
        }
        Ok(Self {
            width,
            height,
            data: ImageData::Single(pixels),
        })
    }

    /// Image owning an animation.
    ///
    /// Every frame must hold `width * height` pixels in the same format.
    pub fn from_animation(width: usize, height: usize, animation: Animation) -> Result<Self> {
        let count = pixel_count(width, height)?;
        let format = animation.pixel_format();
        for (index, frame) in animation.frames().iter().enumerate() {
            if frame.pixels.len() != count {
                return Err(at(ImageError::invalid_data(format!(
                    "frame {index} holds {} pixels, {width}x{height} needs {count}",
                    frame.pixels.len()
                ))));
            }
            if Some(frame.pixels.format()) != format {
                return Err(at(ImageError::invalid_data(format!(
                    "frame {index} is {:?}, frame 0 is {format:?}",
                    frame.pixels.format()
                ))));
            }
        }
        Ok(Self {
            width,
            height,
            data: ImageData::Animation(animation),
        })
    }

    /// Image with dimensions but no pixels.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: ImageData::Empty,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &ImageData {
        &self.data
    }

    pub fn into_data(self) -> ImageData {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.data, ImageData::Empty)
    }

    pub fn is_animation(&self) -> bool {
        matches!(self.data, ImageData::Animation(_))
    }

    pub fn animation(&self) -> Option<&Animation> {
        match &self.data {
            ImageData::Animation(animation) => Some(animation),
            _ => None,
        }
    }

    /// Number of frames: 0 for `Empty`, 1 for a still image.
    pub fn frame_count(&self) -> usize {
        match &self.data {
            ImageData::Empty => 0,
            ImageData::Single(_) => 1,
            ImageData::Animation(animation) => animation.len(),
        }
    }

    /// The single buffer, or frame 0 of an animation.
    pub fn pixels(&self) -> Option<&PixelStorage> {
        match &self.data {
            ImageData::Empty => None,
            ImageData::Single(pixels) => Some(pixels),
            ImageData::Animation(animation) => animation.first().map(|frame| &frame.pixels),
        }
    }

    fn pixels_mut(&mut self) -> Option<&mut PixelStorage> {
        match &mut self.data {
            ImageData::Empty => None,
            ImageData::Single(pixels) => Some(pixels),
            ImageData::Animation(animation) => {
                animation.frames_mut().first_mut().map(|frame| &mut frame.pixels)
            }
        }
    }

    /// Pixel format of the buffer, or of frame 0.
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        self.pixels().map(PixelStorage::format)
    }

    /// Bytes of the buffer, or of frame 0. Empty when there are no pixels.
    pub fn raw_bytes(&self) -> &[u8] {
        self.pixels().map(PixelStorage::as_bytes).unwrap_or_default()
    }

    /// Mutable bytes of the buffer, or of frame 0.
    pub fn raw_bytes_mut(&mut self) -> &mut [u8] {
        match self.pixels_mut() {
            Some(pixels) => pixels.as_bytes_mut(),
            None => &mut [],
        }
    }

    /// Length of [`raw_bytes`](Self::raw_bytes).
    pub fn image_byte_size(&self) -> usize {
        self.raw_bytes().len()
    }

    /// Bytes per row. Fails for a zero-height image.
    pub fn row_byte_size(&self) -> Result<usize> {
        if self.height == 0 {
            return Err(at(ImageError::invalid_data(
                "row size of a zero-height image",
            )));
        }
        Ok(self.image_byte_size() / self.height)
    }

    /// Normalized RGBA colors of the buffer, or of frame 0.
    pub fn iter(&self) -> PixelIter<'_> {
        PixelIter::new(self.pixels())
    }
}
