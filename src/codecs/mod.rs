//! Codec adapters over ecosystem codec crates.
//!
//! Each module provides a thin adapter between zenio's [`Codec`](crate::Codec)
//! trait and the format-specific crate. Adapters translate headers, pixel
//! layouts and errors; they do no bitstream work of their own.

use alloc::vec::Vec;

use whereat::at;

use crate::error::Result;
use crate::format::ImageFormat;
use crate::image::{Image, ImageData};
use crate::pixel::{PixelStorage, Rgba};
use crate::ImageError;

#[cfg(feature = "gif")]
pub(crate) mod gif;

#[cfg(feature = "png")]
pub(crate) mod png;

#[cfg(feature = "qoi")]
pub(crate) mod qoi;

/// The buffer a still-image codec writes.
///
/// A one-frame animation is accepted as a still image; longer animations are
/// rejected rather than silently flattened.
#[allow(dead_code)]
pub(crate) fn still_pixels(format: ImageFormat, image: &Image) -> Result<&PixelStorage> {
    match image.data() {
        ImageData::Empty => Err(at(ImageError::invalid_data("cannot encode an empty image"))),
        ImageData::Single(pixels) => Ok(pixels),
        ImageData::Animation(animation) => match animation.frames() {
            [frame] => Ok(&frame.pixels),
            frames => Err(at(ImageError::invalid_data(alloc::format!(
                "{format:?} cannot store a {}-frame animation",
                frames.len()
            )))),
        },
    }
}

/// Image dimension as the `u32` most headers store.
#[allow(dead_code)]
pub(crate) fn dimension_u32(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| at(ImageError::invalid_data("dimension does not fit in 32 bits")))
}

/// Repack an 8-bit buffer as RGBA8. `None` for 16-bit and float layouts.
#[allow(dead_code)]
pub(crate) fn to_rgba8(pixels: &PixelStorage) -> Option<Vec<Rgba<u8>>> {
    let rgba = match pixels {
        PixelStorage::Gray8(buf) => buf
            .iter()
            .map(|p| {
                let v = p.value();
                Rgba::new(v, v, v, 255)
            })
            .collect(),
        PixelStorage::GrayAlpha8(buf) => buf
            .iter()
            .map(|p| Rgba::new(p.v, p.v, p.v, p.a))
            .collect(),
        PixelStorage::Rgb8(buf) => buf.iter().map(|p| Rgba::new(p.r, p.g, p.b, 255)).collect(),
        PixelStorage::Rgba8(buf) => buf.clone(),
        PixelStorage::Bgr8(buf) => buf.iter().map(|p| Rgba::new(p.r, p.g, p.b, 255)).collect(),
        PixelStorage::Bgra8(buf) => buf.iter().map(|p| Rgba::new(p.r, p.g, p.b, p.a)).collect(),
        _ => return None,
    };
    Some(rgba)
}
