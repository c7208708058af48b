//! Pixel formats, owned pixel storage, and format-independent pixel iteration.
//!
//! Uses typed pixels from the `rgb` crate. Every buffer is a contiguous
//! `Vec` of one pixel type, so its byte view is a zero-copy `bytemuck` cast
//! and its byte length is always `pixel_count * bytes_per_pixel`.

use alloc::vec::Vec;

use bytemuck::Pod;
use whereat::at;

use crate::ImageError;
use crate::error::{Result, ResultExt};

pub use rgb::alt::{BGR as Bgr, BGRA as Bgra, GrayAlpha};
pub use rgb::{Gray, Rgb, Rgba};

/// Channel layout and bit depth of a pixel buffer.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Gray8,
    Gray16,
    GrayAlpha8,
    GrayAlpha16,
    Rgb8,
    Rgba8,
    /// 8-bit BGR (blue, green, red byte order).
    Bgr8,
    /// 8-bit BGRA (blue, green, red, alpha byte order).
    Bgra8,
    Rgb16,
    Rgba16,
    /// 32-bit float RGBA, nominal range `0.0..=1.0`.
    RgbaF32,
}

impl PixelFormat {
    /// Size of one pixel in bytes.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Gray16 | PixelFormat::GrayAlpha8 => 2,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => 3,
            PixelFormat::GrayAlpha16 | PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
            PixelFormat::Rgb16 => 6,
            PixelFormat::Rgba16 => 8,
            PixelFormat::RgbaF32 => 16,
        }
    }

    /// Number of channels per pixel.
    pub const fn channel_count(self) -> usize {
        match self {
            PixelFormat::Gray8 | PixelFormat::Gray16 => 1,
            PixelFormat::GrayAlpha8 | PixelFormat::GrayAlpha16 => 2,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 | PixelFormat::Rgb16 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 | PixelFormat::Rgba16 | PixelFormat::RgbaF32 => 4,
        }
    }

    /// Bits per channel.
    pub const fn bits_per_channel(self) -> u8 {
        (self.bytes_per_pixel() / self.channel_count() * 8) as u8
    }

    /// Whether the layout carries an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelFormat::GrayAlpha8
                | PixelFormat::GrayAlpha16
                | PixelFormat::Rgba8
                | PixelFormat::Bgra8
                | PixelFormat::Rgba16
                | PixelFormat::RgbaF32
        )
    }

    /// Byte length of `pixel_count` pixels, `None` on overflow.
    pub fn byte_size(self, pixel_count: usize) -> Option<usize> {
        pixel_count.checked_mul(self.bytes_per_pixel())
    }
}

/// Owned pixel buffer tagged with its pixel format.
///
/// The variant determines both the channel layout and precision.
/// Dimensions live on the owning [`Image`](crate::Image).
#[derive(Clone, PartialEq)]
#[non_exhaustive]
pub enum PixelStorage {
    Gray8(Vec<Gray<u8>>),
    Gray16(Vec<Gray<u16>>),
    GrayAlpha8(Vec<GrayAlpha<u8>>),
    GrayAlpha16(Vec<GrayAlpha<u16>>),
    Rgb8(Vec<Rgb<u8>>),
    Rgba8(Vec<Rgba<u8>>),
    Bgr8(Vec<Bgr<u8>>),
    Bgra8(Vec<Bgra<u8>>),
    Rgb16(Vec<Rgb<u16>>),
    Rgba16(Vec<Rgba<u16>>),
    RgbaF32(Vec<Rgba<f32>>),
}

/// Apply `$body` to the typed buffer inside any variant.
macro_rules! with_buffer {
    ($storage:expr, $buf:ident => $body:expr) => {
        match $storage {
            PixelStorage::Gray8($buf) => $body,
            PixelStorage::Gray16($buf) => $body,
            PixelStorage::GrayAlpha8($buf) => $body,
            PixelStorage::GrayAlpha16($buf) => $body,
            PixelStorage::Rgb8($buf) => $body,
            PixelStorage::Rgba8($buf) => $body,
            PixelStorage::Bgr8($buf) => $body,
            PixelStorage::Bgra8($buf) => $body,
            PixelStorage::Rgb16($buf) => $body,
            PixelStorage::Rgba16($buf) => $body,
            PixelStorage::RgbaF32($buf) => $body,
        }
    };
}

/// Build a variant of `$format` from a generic constructor `$make::<T>()`.
macro_rules! for_format {
    ($format:expr, $make:ident $(, $arg:expr)*) => {
        match $format {
            PixelFormat::Gray8 => PixelStorage::Gray8($make($($arg),*)?),
            PixelFormat::Gray16 => PixelStorage::Gray16($make($($arg),*)?),
            PixelFormat::GrayAlpha8 => PixelStorage::GrayAlpha8($make($($arg),*)?),
            PixelFormat::GrayAlpha16 => PixelStorage::GrayAlpha16($make($($arg),*)?),
            PixelFormat::Rgb8 => PixelStorage::Rgb8($make($($arg),*)?),
            PixelFormat::Rgba8 => PixelStorage::Rgba8($make($($arg),*)?),
            PixelFormat::Bgr8 => PixelStorage::Bgr8($make($($arg),*)?),
            PixelFormat::Bgra8 => PixelStorage::Bgra8($make($($arg),*)?),
            PixelFormat::Rgb16 => PixelStorage::Rgb16($make($($arg),*)?),
            PixelFormat::Rgba16 => PixelStorage::Rgba16($make($($arg),*)?),
            PixelFormat::RgbaF32 => PixelStorage::RgbaF32($make($($arg),*)?),
        }
    };
}

fn zeroed_vec<T: Pod>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).or_at()?;
    buf.resize(len, T::zeroed());
    Ok(buf)
}

fn copied_vec<T: Pod>(bytes: &[u8]) -> Result<Vec<T>> {
    let len = bytes.len() / core::mem::size_of::<T>();
    let mut buf: Vec<T> = zeroed_vec(len)?;
    bytemuck::cast_slice_mut::<T, u8>(&mut buf).copy_from_slice(bytes);
    Ok(buf)
}

impl PixelStorage {
    /// Allocate zero-filled storage for `pixel_count` pixels.
    ///
    /// Allocation failure is reported as [`ImageError::OutOfMemory`].
    pub fn new(format: PixelFormat, pixel_count: usize) -> Result<Self> {
        if format.byte_size(pixel_count).is_none() {
            return Err(at(ImageError::OutOfMemory));
        }
        Ok(for_format!(format, zeroed_vec, pixel_count))
    }

    /// Copy raw interleaved bytes into new storage.
    ///
    /// `bytes.len()` must be a whole number of pixels.
    pub fn from_bytes(format: PixelFormat, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % format.bytes_per_pixel() != 0 {
            return Err(at(ImageError::invalid_data(alloc::format!(
                "{} bytes is not a whole number of {:?} pixels",
                bytes.len(),
                format
            ))));
        }
        Ok(for_format!(format, copied_vec, bytes))
    }

    /// The pixel format tag.
    pub fn format(&self) -> PixelFormat {
        match self {
            PixelStorage::Gray8(_) => PixelFormat::Gray8,
            PixelStorage::Gray16(_) => PixelFormat::Gray16,
            PixelStorage::GrayAlpha8(_) => PixelFormat::GrayAlpha8,
            PixelStorage::GrayAlpha16(_) => PixelFormat::GrayAlpha16,
            PixelStorage::Rgb8(_) => PixelFormat::Rgb8,
            PixelStorage::Rgba8(_) => PixelFormat::Rgba8,
            PixelStorage::Bgr8(_) => PixelFormat::Bgr8,
            PixelStorage::Bgra8(_) => PixelFormat::Bgra8,
            PixelStorage::Rgb16(_) => PixelFormat::Rgb16,
            PixelStorage::Rgba16(_) => PixelFormat::Rgba16,
            PixelStorage::RgbaF32(_) => PixelFormat::RgbaF32,
        }
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        with_buffer!(self, buf => buf.len())
    }

    /// Whether the buffer holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interleaved bytes in native endianness.
    pub fn as_bytes(&self) -> &[u8] {
        with_buffer!(self, buf => bytemuck::cast_slice(buf.as_slice()))
    }

    /// Mutable interleaved bytes in native endianness.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        with_buffer!(self, buf => bytemuck::cast_slice_mut(buf.as_mut_slice()))
    }

    /// Byte length, always `len() * format().bytes_per_pixel()`.
    pub fn byte_len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Iterate pixels as normalized RGBA.
    pub fn iter(&self) -> PixelIter<'_> {
        PixelIter::new(Some(self))
    }

    /// Normalized color of the pixel at `index`.
    pub fn color_at(&self, index: usize) -> Option<Rgba<f32>> {
        const U8: f32 = 255.0;
        const U16: f32 = 65535.0;

        let gray = |v: f32, a: f32| Rgba { r: v, g: v, b: v, a };
        let color = match self {
            PixelStorage::Gray8(buf) => {
                let p = buf.get(index)?;
                gray(f32::from(p.value()) / U8, 1.0)
            }
            PixelStorage::Gray16(buf) => {
                let p = buf.get(index)?;
                gray(f32::from(p.value()) / U16, 1.0)
            }
            PixelStorage::GrayAlpha8(buf) => {
                let p = buf.get(index)?;
                gray(f32::from(p.v) / U8, f32::from(p.a) / U8)
            }
            PixelStorage::GrayAlpha16(buf) => {
                let p = buf.get(index)?;
                gray(f32::from(p.v) / U16, f32::from(p.a) / U16)
            }
            PixelStorage::Rgb8(buf) => {
                let p = buf.get(index)?;
                Rgba {
                    r: f32::from(p.r) / U8,
                    g: f32::from(p.g) / U8,
                    b: f32::from(p.b) / U8,
                    a: 1.0,
                }
            }
            PixelStorage::Rgba8(buf) => {
                let p = buf.get(index)?;
                Rgba {
                    r: f32::from(p.r) / U8,
                    g: f32::from(p.g) / U8,
                    b: f32::from(p.b) / U8,
                    a: f32::from(p.a) / U8,
                }
            }
            PixelStorage::Bgr8(buf) => {
                let p = buf.get(index)?;
                Rgba {
                    r: f32::from(p.r) / U8,
                    g: f32::from(p.g) / U8,
                    b: f32::from(p.b) / U8,
                    a: 1.0,
                }
            }
            PixelStorage::Bgra8(buf) => {
                let p = buf.get(index)?;
                Rgba {
                    r: f32::from(p.r) / U8,
                    g: f32::from(p.g) / U8,
                    b: f32::from(p.b) / U8,
                    a: f32::from(p.a) / U8,
                }
            }
            PixelStorage::Rgb16(buf) => {
                let p = buf.get(index)?;
                Rgba {
                    r: f32::from(p.r) / U16,
                    g: f32::from(p.g) / U16,
                    b: f32::from(p.b) / U16,
                    a: 1.0,
                }
            }
            PixelStorage::Rgba16(buf) => {
                let p = buf.get(index)?;
                Rgba {
                    r: f32::from(p.r) / U16,
                    g: f32::from(p.g) / U16,
                    b: f32::from(p.b) / U16,
                    a: f32::from(p.a) / U16,
                }
            }
            PixelStorage::RgbaF32(buf) => *buf.get(index)?,
        };
        Some(color)
    }
}

impl core::fmt::Debug for PixelStorage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelStorage")
            .field("format", &self.format())
            .field("len", &self.len())
            .finish()
    }
}

/// Lazy, finite iterator over the pixels of one buffer as normalized
/// `Rgba<f32>`.
///
/// Restart by constructing a new iterator. An iterator over no storage
/// yields nothing.
#[derive(Clone, Debug)]
pub struct PixelIter<'a> {
    storage: Option<&'a PixelStorage>,
    index: usize,
    end: usize,
}

impl<'a> PixelIter<'a> {
    pub(crate) fn new(storage: Option<&'a PixelStorage>) -> Self {
        let end = storage.map_or(0, PixelStorage::len);
        Self {
            storage,
            index: 0,
            end,
        }
    }

    /// Iterator that yields nothing.
    pub fn empty() -> Self {
        Self::new(None)
    }
}

impl Iterator for PixelIter<'_> {
    type Item = Rgba<f32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        let color = self.storage?.color_at(self.index)?;
        self.index += 1;
        Some(color)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PixelIter<'_> {}

impl core::iter::FusedIterator for PixelIter<'_> {}
