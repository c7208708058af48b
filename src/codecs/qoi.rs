//! QOI codec adapter using the qoi crate.

use alloc::vec::Vec;

use whereat::at;

use crate::codec::{Codec, DecodeContext, EncodeContext};
use crate::codecs::{dimension_u32, still_pixels};
use crate::config::QoiColorspace;
use crate::error::Result;
use crate::image::Image;
use crate::pixel::{PixelFormat, PixelStorage, Rgb, Rgba};
use crate::stream::Stream;
use crate::{ImageError, ImageFormat};

const MAGIC: [u8; 4] = *b"qoif";

/// QOI still-image codec. Decodes to `Rgb8` or `Rgba8` per the header.
#[derive(Clone, Copy, Debug, Default)]
pub struct QoiCodec;

fn qoi_error(error: qoi::Error) -> whereat::At<ImageError> {
    match error {
        qoi::Error::IoError(e) => at(ImageError::from(e)),
        other => at(ImageError::from_codec(ImageFormat::Qoi, other)),
    }
}

/// Interleaved RGB or RGBA bytes for `pixels`.
fn encodable(pixels: &PixelStorage) -> Result<Vec<u8>> {
    let bytes = match pixels {
        PixelStorage::Rgb8(_) | PixelStorage::Rgba8(_) => pixels.as_bytes().to_vec(),
        PixelStorage::Bgr8(buf) => {
            let rgb: Vec<Rgb<u8>> = buf.iter().map(|p| Rgb::new(p.r, p.g, p.b)).collect();
            bytemuck::cast_slice::<_, u8>(rgb.as_slice()).to_vec()
        }
        PixelStorage::Bgra8(buf) => {
            let rgba: Vec<Rgba<u8>> = buf.iter().map(|p| Rgba::new(p.r, p.g, p.b, p.a)).collect();
            bytemuck::cast_slice::<_, u8>(rgba.as_slice()).to_vec()
        }
        other => {
            return Err(at(ImageError::UnsupportedPixelFormat {
                format: ImageFormat::Qoi,
                pixel_format: other.format(),
            }));
        }
    };
    Ok(bytes)
}

impl Codec for QoiCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Qoi
    }

    fn detect(&self, stream: &mut Stream<'_>) -> Result<bool> {
        let mut header = [0u8; MAGIC.len()];
        let n = stream.read_up_to(&mut header)?;
        Ok(n == MAGIC.len() && header == MAGIC)
    }

    fn decode(&self, ctx: &DecodeContext<'_>, stream: &mut Stream<'_>) -> Result<Image> {
        ctx.check_stop()?;

        let mut decoder = qoi::Decoder::from_stream(&mut *stream).map_err(qoi_error)?;
        let header = decoder.header();
        ctx.check_header(u64::from(header.width), u64::from(header.height), 1)?;

        let format = match header.channels {
            qoi::Channels::Rgb => PixelFormat::Rgb8,
            qoi::Channels::Rgba => PixelFormat::Rgba8,
        };
        let width = header.width as usize;
        let height = header.height as usize;
        let mut pixels = ctx.alloc_pixels(width, height, format)?;

        ctx.check_stop()?;
        decoder
            .decode_to_buf(pixels.as_bytes_mut())
            .map_err(qoi_error)?;

        Image::from_pixels(width, height, pixels)
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        stream: &mut Stream<'_>,
        image: &Image,
    ) -> Result<()> {
        let pixels = still_pixels(ImageFormat::Qoi, image)?;
        let width = dimension_u32(image.width())?;
        let height = dimension_u32(image.height())?;
        let bytes = encodable(pixels)?;
        ctx.check_stop()?;

        let colorspace = match ctx.options().qoi.as_ref().and_then(|o| o.colorspace) {
            Some(QoiColorspace::Linear) => qoi::ColorSpace::Linear,
            Some(QoiColorspace::Srgb) | None => qoi::ColorSpace::Srgb,
        };
        let encoder = qoi::Encoder::new(&bytes, width, height)
            .map_err(qoi_error)?
            .with_colorspace(colorspace);
        encoder.encode_to_stream(stream).map_err(qoi_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EncoderOptions, QoiOptions};
    use crate::limits::Limits;
    use enough::Unstoppable;

    fn encode_with(image: &Image, options: &EncoderOptions) -> Result<Vec<u8>> {
        let ctx = EncodeContext::new(options, &Unstoppable);
        let mut stream = Stream::growable();
        QoiCodec.encode(&ctx, &mut stream, image)?;
        Ok(stream.into_vec().unwrap())
    }

    #[test]
    fn rgba_round_trip() {
        let bytes: Vec<u8> = (0u8..48).collect();
        let image = Image::from_raw_pixels(4, 3, &bytes, PixelFormat::Rgba8).unwrap();
        let data = encode_with(&image, &EncoderOptions::default()).unwrap();
        assert!(QoiCodec.detect(&mut Stream::from_slice(&data)).unwrap());

        let limits = Limits::none();
        let ctx = DecodeContext::new(&limits, &Unstoppable);
        let decoded = QoiCodec.decode(&ctx, &mut Stream::from_slice(&data)).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn linear_colorspace_in_header() {
        let image = Image::create(2, 2, PixelFormat::Rgb8).unwrap();
        let options =
            EncoderOptions::default().with_qoi(QoiOptions::default().with_colorspace(QoiColorspace::Linear));
        let data = encode_with(&image, &options).unwrap();
        // Byte 13 of the header is the colorspace: 0 sRGB, 1 linear.
        assert_eq!(data[13], 1);
        assert_eq!(data[12], 3);
    }

    #[test]
    fn gray_is_unsupported() {
        let image = Image::create(2, 2, PixelFormat::Gray8).unwrap();
        let err = encode_with(&image, &EncoderOptions::default())
            .unwrap_err()
            .decompose().0;
        assert!(matches!(
            err,
            ImageError::UnsupportedPixelFormat {
                format: ImageFormat::Qoi,
                pixel_format: PixelFormat::Gray8
            }
        ));
    }
}
