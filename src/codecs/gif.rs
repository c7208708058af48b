//! GIF codec adapter using the gif crate.
//!
//! Decoding composites every sub-frame onto a full canvas, so each
//! [`AnimationFrame`] holds complete `Rgba8` pixels. A one-frame GIF decodes
//! to a still image. Encoding quantizes each frame with NeuQuant.

use alloc::vec::Vec;
use std::io::BufReader;

use imgref::{ImgRef, ImgRefMut};
use log::debug;
use whereat::at;

use crate::animation::{Animation, AnimationFrame, LoopCount};
use crate::codec::{Codec, DecodeContext, EncodeContext};
use crate::codecs::to_rgba8;
use crate::error::Result;
use crate::image::{Image, ImageData};
use crate::pixel::{PixelFormat, PixelStorage, Rgba};
use crate::stream::Stream;
use crate::{ImageError, ImageFormat};

const DEFAULT_SPEED: i32 = 10;

/// GIF codec with animation support.
#[derive(Clone, Copy, Debug, Default)]
pub struct GifCodec;

fn decoding_error(error: gif::DecodingError) -> whereat::At<ImageError> {
    match error {
        gif::DecodingError::Io(e) => at(ImageError::from(e)),
        other => at(ImageError::from_codec(ImageFormat::Gif, other)),
    }
}

fn encoding_error(error: gif::EncodingError) -> whereat::At<ImageError> {
    match error {
        gif::EncodingError::Io(e) => at(ImageError::from(e)),
        other => at(ImageError::from_codec(ImageFormat::Gif, other)),
    }
}

fn dimension_u16(value: usize) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| at(ImageError::invalid_data("GIF dimensions are limited to 65535")))
}

/// Visible part of a sub-frame after clipping to the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rect {
    left: usize,
    top: usize,
    width: usize,
    height: usize,
}

impl Rect {
    fn clipped(frame: &gif::Frame<'_>, canvas_width: usize, canvas_height: usize) -> Self {
        let left = usize::from(frame.left).min(canvas_width);
        let top = usize::from(frame.top).min(canvas_height);
        Self {
            left,
            top,
            width: usize::from(frame.width).min(canvas_width - left),
            height: usize::from(frame.height).min(canvas_height - top),
        }
    }
}

/// Draw the opaque pixels of `frame` over `canvas`.
fn composite(
    canvas: &mut [Rgba<u8>],
    width: usize,
    height: usize,
    frame: &gif::Frame<'_>,
    rect: Rect,
) -> Result<()> {
    let stride = usize::from(frame.width);
    let expected = stride * usize::from(frame.height);
    let src: &[Rgba<u8>] = bytemuck::try_cast_slice(&frame.buffer[..])
        .map_err(|_| at(ImageError::invalid_data("GIF frame buffer is not RGBA")))?;
    if src.len() < expected {
        return Err(at(ImageError::invalid_data("GIF frame buffer is short")));
    }
    if rect.width == 0 || rect.height == 0 {
        return Ok(());
    }

    let src = ImgRef::new_stride(src, rect.width, rect.height, stride);
    let mut full = ImgRefMut::new(canvas, width, height);
    let mut dst = full.sub_image_mut(rect.left, rect.top, rect.width, rect.height);
    for (dst_row, src_row) in dst.rows_mut().zip(src.rows()) {
        for (dst_px, src_px) in dst_row.iter_mut().zip(src_row) {
            if src_px.a != 0 {
                *dst_px = *src_px;
            }
        }
    }
    Ok(())
}

/// Restore the frame area to transparent, as disposal method 2 asks.
fn clear(canvas: &mut [Rgba<u8>], width: usize, height: usize, rect: Rect) {
    if rect.width == 0 || rect.height == 0 {
        return;
    }
    let mut full = ImgRefMut::new(canvas, width, height);
    let mut dst = full.sub_image_mut(rect.left, rect.top, rect.width, rect.height);
    for row in dst.rows_mut() {
        row.fill(Rgba::new(0, 0, 0, 0));
    }
}

/// Copy the canvas through the decode context so limits apply to every
/// frame kept.
fn copy_canvas(
    ctx: &DecodeContext<'_>,
    width: usize,
    height: usize,
    canvas: &PixelStorage,
) -> Result<PixelStorage> {
    let mut copy = ctx.alloc_pixels(width, height, PixelFormat::Rgba8)?;
    copy.as_bytes_mut().copy_from_slice(canvas.as_bytes());
    Ok(copy)
}

fn rgba_canvas(pixels: &mut PixelStorage) -> Result<&mut Vec<Rgba<u8>>> {
    match pixels {
        PixelStorage::Rgba8(buf) => Ok(buf),
        _ => Err(at(ImageError::invalid_data("GIF canvas must be Rgba8"))),
    }
}

impl Codec for GifCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Gif
    }

    fn detect(&self, stream: &mut Stream<'_>) -> Result<bool> {
        let mut header = [0u8; 6];
        let n = stream.read_up_to(&mut header)?;
        Ok(n == header.len() && (&header == b"GIF87a" || &header == b"GIF89a"))
    }

    fn decode(&self, ctx: &DecodeContext<'_>, stream: &mut Stream<'_>) -> Result<Image> {
        ctx.check_stop()?;

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options
            .read_info(BufReader::new(&mut *stream))
            .map_err(decoding_error)?;

        let width = usize::from(decoder.width());
        let height = usize::from(decoder.height());
        ctx.check_header(width as u64, height as u64, 1)?;

        let mut canvas = ctx.alloc_pixels(width, height, PixelFormat::Rgba8)?;
        let frame_bytes = canvas.byte_len() as u64;
        let mut frames = Vec::new();

        while let Some(frame) = decoder.read_next_frame().map_err(decoding_error)? {
            ctx.check_stop()?;
            ctx.limits().check_frames(frames.len() as u64 + 1)?;

            // Decoded frames share one memory budget.
            ctx.limits()
                .check_memory((frames.len() as u64 + 1).saturating_mul(frame_bytes))?;

            let rect = Rect::clipped(frame, width, height);
            let saved = match frame.dispose {
                gif::DisposalMethod::Previous => Some(copy_canvas(ctx, width, height, &canvas)?),
                _ => None,
            };

            composite(rgba_canvas(&mut canvas)?, width, height, frame, rect)?;
            let duration = f32::from(frame.delay) / 100.0;
            frames.push(AnimationFrame::new(
                copy_canvas(ctx, width, height, &canvas)?,
                duration,
            ));

            match frame.dispose {
                gif::DisposalMethod::Background => {
                    clear(rgba_canvas(&mut canvas)?, width, height, rect);
                }
                gif::DisposalMethod::Previous => {
                    if let Some(saved) = saved {
                        canvas = saved;
                    }
                }
                _ => {}
            }
        }

        let loop_count = match decoder.repeat() {
            gif::Repeat::Infinite => LoopCount::Infinite,
            gif::Repeat::Finite(n) => LoopCount::Finite(u32::from(n)),
        };
        debug!("gif: {} frames, {:?}", frames.len(), loop_count);

        match frames.len() {
            0 => Err(at(ImageError::invalid_data("GIF has no frames"))),
            1 => {
                let frame = frames.remove(0);
                Image::from_pixels(width, height, frame.pixels)
            }
            _ => {
                let mut animation: Animation = frames.into_iter().collect();
                animation.set_loop_count(loop_count);
                Image::from_animation(width, height, animation)
            }
        }
    }

    fn encode(
        &self,
        ctx: &EncodeContext<'_>,
        stream: &mut Stream<'_>,
        image: &Image,
    ) -> Result<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(at(ImageError::invalid_data(
                "GIF cannot store a zero-sized image",
            )));
        }
        let width = dimension_u16(image.width())?;
        let height = dimension_u16(image.height())?;
        let gif_options = ctx.options().gif.clone().unwrap_or_default();
        let speed = gif_options.speed.unwrap_or(DEFAULT_SPEED).clamp(1, 30);

        let (frames, loop_count): (Vec<(&PixelStorage, f32)>, Option<LoopCount>) =
            match image.data() {
                ImageData::Empty => {
                    return Err(at(ImageError::invalid_data("cannot encode an empty image")));
                }
                ImageData::Single(pixels) => (vec![(pixels, 0.0)], None),
                ImageData::Animation(animation) => (
                    animation
                        .frames()
                        .iter()
                        .map(|frame| (&frame.pixels, frame.duration()))
                        .collect(),
                    Some(animation.loop_count()),
                ),
            };
        if frames.is_empty() {
            return Err(at(ImageError::invalid_data("cannot encode a zero-frame animation")));
        }

        let mut encoder =
            gif::Encoder::new(&mut *stream, width, height, &[]).map_err(encoding_error)?;
        if let Some(loop_count) = gif_options.loop_count.or(loop_count) {
            let repeat = match loop_count {
                LoopCount::Infinite => gif::Repeat::Infinite,
                LoopCount::Finite(n) => gif::Repeat::Finite(u16::try_from(n).unwrap_or(u16::MAX)),
            };
            encoder.set_repeat(repeat).map_err(encoding_error)?;
        }

        for (pixels, duration) in frames {
            ctx.check_stop()?;
            let rgba = to_rgba8(pixels).ok_or_else(|| {
                at(ImageError::UnsupportedPixelFormat {
                    format: ImageFormat::Gif,
                    pixel_format: pixels.format(),
                })
            })?;
            let mut bytes: Vec<u8> = bytemuck::cast_slice(rgba.as_slice()).to_vec();
            let mut frame = gif::Frame::from_rgba_speed(width, height, &mut bytes, speed);
            frame.delay = (duration * 100.0).round().min(f32::from(u16::MAX)) as u16;
            frame.dispose = gif::DisposalMethod::Background;
            encoder.write_frame(&frame).map_err(encoding_error)?;
        }

        encoder.into_inner().map_err(|e| at(ImageError::from(e)))?;
        Ok(())
    }
}
