//! PNG codec adapter using the png crate.
//!
//! Palette and sub-byte images are expanded to 8-bit gray or RGB(A) on
//! decode. 16-bit samples are stored big-endian in PNG and native-endian in
//! [`PixelStorage`]. Only the default image of an APNG is decoded.

use alloc::vec::Vec;
use std::io::BufReader;

use whereat::at;

use crate::codec::{Codec, DecodeContext, EncodeContext};
use crate::codecs::{dimension_u32, still_pixels};
use crate::error::Result;
use crate::image::Image;
use crate::pixel::{PixelFormat, PixelStorage, Rgb, Rgba};
use crate::stream::Stream;
use crate::{ImageError, ImageFormat};

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// PNG still-image codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngCodec;

fn decoding_error(error: png::DecodingError) -> whereat::At<ImageError> {
    match error {
        png::DecodingError::IoError(e) => at(ImageError::from(e)),
        other => at(ImageError::from_codec(ImageFormat::Png, other)),
    }
}

fn encoding_error(error: png::EncodingError) -> whereat::At<ImageError> {
    match error {
        png::EncodingError::IoError(e) => at(ImageError::from(e)),
        other => at(ImageError::from_codec(ImageFormat::Png, other)),
    }
}

fn pixel_format(color: png::ColorType, depth: png::BitDepth) -> Option<PixelFormat> {
    use png::{BitDepth, ColorType};

    let format = match (color, depth) {
        (ColorType::Grayscale, BitDepth::Eight) => PixelFormat::Gray8,
        (ColorType::Grayscale, BitDepth::Sixteen) => PixelFormat::Gray16,
        (ColorType::GrayscaleAlpha, BitDepth::Eight) => PixelFormat::GrayAlpha8,
        (ColorType::GrayscaleAlpha, BitDepth::Sixteen) => PixelFormat::GrayAlpha16,
        (ColorType::Rgb, BitDepth::Eight) => PixelFormat::Rgb8,
        (ColorType::Rgb, BitDepth::Sixteen) => PixelFormat::Rgb16,
        (ColorType::Rgba, BitDepth::Eight) => PixelFormat::Rgba8,
        (ColorType::Rgba, BitDepth::Sixteen) => PixelFormat::Rgba16,
        _ => return None,
    };
    Some(format)
}

/// Swap every 16-bit sample between big-endian and native order.
fn swap_be_u16(bytes: &mut [u8]) {
    for sample in bytes.chunks_exact_mut(2) {
        let value = u16::from_be_bytes([sample[0], sample[1]]);
        sample.copy_from_slice(&value.to_ne_bytes());
    }
}

/// Header color type, bit depth, and big-endian bytes for `pixels`.
fn encodable(pixels: &PixelStorage) -> Result<(png::ColorType, png::BitDepth, Vec<u8>)> {
    use png::{BitDepth, ColorType};

    let format = pixels.format();
    let (color, depth) = match format {
        PixelFormat::Gray8 => (ColorType::Grayscale, BitDepth::Eight),
        PixelFormat::Gray16 => (ColorType::Grayscale, BitDepth::Sixteen),
        PixelFormat::GrayAlpha8 => (ColorType::GrayscaleAlpha, BitDepth::Eight),
        PixelFormat::GrayAlpha16 => (ColorType::GrayscaleAlpha, BitDepth::Sixteen),
        PixelFormat::Rgb8 | PixelFormat::Bgr8 => (ColorType::Rgb, BitDepth::Eight),
        PixelFormat::Rgb16 => (ColorType::Rgb, BitDepth::Sixteen),
        PixelFormat::Rgba8 | PixelFormat::Bgra8 => (ColorType::Rgba, BitDepth::Eight),
        PixelFormat::Rgba16 => (ColorType::Rgba, BitDepth::Sixteen),
        PixelFormat::RgbaF32 => {
            return Err(at(ImageError::UnsupportedPixelFormat {
                format: ImageFormat::Png,
                pixel_format: format,
            }));
        }
    };

    let bytes = match pixels {
        PixelStorage::Bgr8(buf) => {
            let rgb: Vec<Rgb<u8>> = buf.iter().map(|p| Rgb::new(p.r, p.g, p.b)).collect();
            bytemuck::cast_slice::<_, u8>(rgb.as_slice()).to_vec()
        }
        PixelStorage::Bgra8(buf) => {
            let rgba: Vec<Rgba<u8>> = buf.iter().map(|p| Rgba::new(p.r, p.g, p.b, p.a)).collect();
            bytemuck::cast_slice::<_, u8>(rgba.as_slice()).to_vec()
        }
        other => {
            let mut bytes = other.as_bytes().to_vec();
            if depth == BitDepth::Sixteen {
                swap_be_u16(&mut bytes);
            }
            bytes
        }
    };
    Ok((color, depth, bytes))
}

impl Codec for PngCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn detect(&self, stream: &mut Stream<'_>) -> Result<bool> {
        let mut header = [0u8; SIGNATURE.len()];
        let n = stream.read_up_to(&mut header)?;
        Ok(n == SIGNATURE.len() && header == SIGNATURE)
    }

    fn decode(&self, ctx: &DecodeContext<'_>, stream: &mut Stream<'_>) -> Result<Image> {
        ctx.check_stop()?;

        let mut decoder = png::Decoder::new(BufReader::new(&mut *stream));
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder.read_info().map_err(decoding_error)?;

        let info = reader.info();
        let width = info.width as usize;
        let height = info.height as usize;
        ctx.check_header(u64::from(info.width), u64::from(info.height), 1)?;

        let (color, depth) = reader.output_color_type();
        let format = pixel_format(color, depth).ok_or_else(|| {
            at(ImageError::invalid_data(alloc::format!(
                "unexpected PNG output layout {color:?}/{depth:?}"
            )))
        })?;

        let mut pixels = ctx.alloc_pixels(width, height, format)?;
        let needed = reader.output_buffer_size().ok_or_else(|| {
            at(ImageError::invalid_data("cannot determine PNG output buffer size"))
        })?;
        if needed != pixels.byte_len() {
            return Err(at(ImageError::invalid_data(alloc::format!(
                "PNG output needs {needed} bytes, {}x{} {format:?} holds {}",
                width,
                height,
                pixels.byte_len()
            ))));
        }

        ctx.check_stop()?;
        reader
            .next_frame(pixels.as_bytes_mut())
            .map_err(decoding_error)?;
        if format.bits_per_channel() == 16 {
            swap_be_u16(pixels.as_bytes_mut());
        }

        Image::from_pixels(width, height, pixels)
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        stream: &mut Stream<'_>,
        image: &Image,
    ) -> Result<()> {
        let pixels = still_pixels(ImageFormat::Png, image)?;
        let width = dimension_u32(image.width())?;
        let height = dimension_u32(image.height())?;
        let (color, depth, bytes) = encodable(pixels)?;
        ctx.check_stop()?;

        let mut encoder = png::Encoder::new(&mut *stream, width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        if let Some(options) = &ctx.options().png {
            if let Some(compression) = options.compression {
                encoder.set_compression(compression);
            }
            if let Some(filter) = options.filter {
                encoder.set_filter(filter);
            }
        }

        let mut writer = encoder.write_header().map_err(encoding_error)?;
        writer.write_image_data(&bytes).map_err(encoding_error)?;
        writer.finish().map_err(encoding_error)?;
        Ok(())
    }
}
