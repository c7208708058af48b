//! # zenio
//!
//! Format-agnostic image I/O: detect the format of a byte stream, decode it
//! into one uniform pixel/animation model, and encode that model back into a
//! chosen format.
//!
//! Codecs are feature-gated adapters over ecosystem crates. Enable only what
//! you need:
//!
//! ```toml
//! [dependencies]
//! zenio = { version = "0.1", default-features = false, features = ["png", "gif"] }
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zenio::{EncoderOptions, Image, ImageFormat, PixelFormat};
//!
//! // Decode whatever the file contains
//! let image = Image::from_file_path("input.gif")?;
//! println!(
//!     "{}x{} {:?}, {} frames",
//!     image.width(),
//!     image.height(),
//!     image.pixel_format(),
//!     image.frame_count()
//! );
//!
//! // Encode into a caller buffer that never grows
//! let still = Image::create(32, 32, PixelFormat::Rgba8)?;
//! let mut buffer = vec![0u8; 64 * 1024];
//! let written = still.write_to_memory(&mut buffer, ImageFormat::Qoi, &EncoderOptions::default())?;
//! println!("{} bytes", written.len());
//! # Ok::<(), whereat::At<zenio::ImageError>>(())
//! ```
//!
//! ## Dispatch
//!
//! [`Registry`] holds codecs in probe order. Content detection asks each
//! codec in turn and takes the first match; writing looks a codec up by its
//! [`ImageFormat`] tag. The built-in registry probes PNG, then QOI, then GIF.

#![forbid(unsafe_code)]

extern crate alloc;

mod animation;
mod codec;
pub(crate) mod codecs;
pub mod config;
mod decode;
mod encode;
mod error;
mod format;
mod image;
mod limits;
pub mod pixel;
mod registry;
mod stream;

pub use animation::{Animation, AnimationFrame, LoopCount};
pub use codec::{Codec, DecodeContext, EncodeContext};
#[cfg(feature = "gif")]
pub use codecs::gif::GifCodec;
#[cfg(feature = "png")]
pub use codecs::png::PngCodec;
#[cfg(feature = "qoi")]
pub use codecs::qoi::QoiCodec;
pub use config::EncoderOptions;
pub use decode::DecodeRequest;
pub use encode::EncodeRequest;
pub use enough::{Stop, StopReason, Unstoppable};
pub use error::{ErrorKind, ImageError, Result};
pub use format::ImageFormat;
pub use image::{Image, ImageData};
pub use limits::Limits;
pub use pixel::{PixelFormat, PixelIter, PixelStorage};
pub use registry::Registry;
pub use stream::Stream;

// Re-export pixel crates so callers can name buffer element types.
pub use imgref;
pub use rgb;
