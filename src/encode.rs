//! Write orchestration: resolve a codec by format tag and encode.

use alloc::vec::Vec;
use std::fs::File;
use std::path::Path;

use enough::Stop;
use log::debug;
use whereat::at;

use crate::codec::{Codec, EncodeContext};
use crate::config::EncoderOptions;
use crate::error::{Result, ResultExt};
use crate::format::ImageFormat;
use crate::image::Image;
use crate::registry::Registry;
use crate::stream::Stream;
use crate::ImageError;

/// Image encode request builder.
///
/// # Example
///
/// ```no_run
/// use zenio::{EncodeRequest, Image, ImageFormat, PixelFormat};
///
/// let image = Image::create(64, 64, PixelFormat::Rgba8)?;
/// let bytes = EncodeRequest::new(ImageFormat::Png).encode_to_vec(&image)?;
/// # Ok::<(), whereat::At<zenio::ImageError>>(())
/// ```
#[derive(Clone, Copy)]
pub struct EncodeRequest<'a> {
    format: ImageFormat,
    registry: Option<&'a Registry>,
    options: Option<&'a EncoderOptions>,
    stop: Option<&'a dyn Stop>,
}

impl<'a> EncodeRequest<'a> {
    /// Encode to `format` with the built-in registry and codec defaults.
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            registry: None,
            options: None,
            stop: None,
        }
    }

    /// Resolve the codec in this registry instead of the built-in one.
    pub fn with_registry(mut self, registry: &'a Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set per-format encoder options.
    pub fn with_options(mut self, options: &'a EncoderOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set a cancellation token.
    pub fn with_stop(mut self, stop: &'a dyn Stop) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Reject empty images, then resolve the codec. Performs no I/O.
    fn prepare(&self, image: &Image) -> Result<&'a dyn Codec> {
        if image.is_empty() {
            return Err(at(ImageError::invalid_data("cannot encode an empty image")));
        }
        let registry = match self.registry {
            Some(registry) => registry,
            None => Registry::builtin(),
        };
        registry.resolve_by_format(self.format)
    }

    fn run(&self, codec: &dyn Codec, stream: &mut Stream<'_>, image: &Image) -> Result<()> {
        let defaults = EncoderOptions::default();
        let options = self.options.unwrap_or(&defaults);
        let stop: &dyn Stop = self.stop.unwrap_or(&enough::Unstoppable);

        stop.check().or_at()?;
        let ctx = EncodeContext::new(options, stop);
        codec.encode(&ctx, stream, image)?;
        debug!(
            "encoded {:?} {}x{} ({} frames)",
            codec.format(),
            image.width(),
            image.height(),
            image.frame_count()
        );
        Ok(())
    }

    /// Encode at the stream's current position.
    pub fn encode_to_stream(&self, image: &Image, stream: &mut Stream<'_>) -> Result<()> {
        let codec = self.prepare(image)?;
        self.run(codec, stream, image)
    }

    /// Create or truncate the file at `path` and encode into it.
    ///
    /// The file is not created when the image is empty or the format has no
    /// codec.
    pub fn encode_to_file_path(&self, image: &Image, path: impl AsRef<Path>) -> Result<()> {
        let codec = self.prepare(image)?;
        let file = File::create(path.as_ref()).or_at()?;
        self.run(codec, &mut Stream::from_file(file), image)
    }

    /// Encode into an open, writable file at its current position.
    pub fn encode_to_file(&self, image: &Image, file: File) -> Result<()> {
        let codec = self.prepare(image)?;
        self.run(codec, &mut Stream::from_file(file), image)
    }

    /// Encode into a caller buffer that never grows.
    ///
    /// Returns the written prefix of `buffer`. Fails with
    /// [`ImageError::NoSpaceLeft`] when the encoding does not fit.
    pub fn encode_to_memory<'b>(&self, image: &Image, buffer: &'b mut [u8]) -> Result<&'b [u8]> {
        let codec = self.prepare(image)?;
        let written = {
            let mut stream = Stream::from_mut_slice(&mut *buffer);
            self.run(codec, &mut stream, image)?;
            stream.position()?
        };
        let written = usize::try_from(written)
            .map_err(|_| at(ImageError::NoSpaceLeft))?;
        Ok(&buffer[..written])
    }

    /// Encode into a fresh growable buffer.
    pub fn encode_to_vec(&self, image: &Image) -> Result<Vec<u8>> {
        let codec = self.prepare(image)?;
        let mut stream = Stream::growable();
        self.run(codec, &mut stream, image)?;
        Ok(stream.into_vec().unwrap_or_default())
    }
}

impl Image {
    /// Encode to `format` into a newly created file at `path`.
    pub fn write_to_file_path(
        &self,
        path: impl AsRef<Path>,
        format: ImageFormat,
        options: &EncoderOptions,
    ) -> Result<()> {
        EncodeRequest::new(format)
            .with_options(options)
            .encode_to_file_path(self, path)
    }

    /// Encode to `format` into an open file.
    pub fn write_to_file(
        &self,
        file: File,
        format: ImageFormat,
        options: &EncoderOptions,
    ) -> Result<()> {
        EncodeRequest::new(format)
            .with_options(options)
            .encode_to_file(self, file)
    }

    /// Encode to `format` into `buffer`, returning the written prefix.
    pub fn write_to_memory<'b>(
        &self,
        buffer: &'b mut [u8],
        format: ImageFormat,
        options: &EncoderOptions,
    ) -> Result<&'b [u8]> {
        EncodeRequest::new(format)
            .with_options(options)
            .encode_to_memory(self, buffer)
    }

    /// Encode to `format` into a new `Vec`.
    pub fn write_to_vec(&self, format: ImageFormat, options: &EncoderOptions) -> Result<Vec<u8>> {
        EncodeRequest::new(format)
            .with_options(options)
            .encode_to_vec(self)
    }

    /// Encode to the format named by the extension of `path`, with codec
    /// defaults.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path).ok_or_else(|| {
            at(ImageError::invalid_data(alloc::format!(
                "no image format for extension of {}",
                path.display()
            )))
        })?;
        EncodeRequest::new(format).encode_to_file_path(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn empty_image_rejected_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let image = Image::empty(4, 4);
        let options = EncoderOptions::default();

        let err = image
            .write_to_file_path(&path, ImageFormat::Png, &options)
            .unwrap_err()
            .decompose().0;
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(!path.exists());

        let mut buffer = [0xAAu8; 64];
        let err = image
            .write_to_memory(&mut buffer, ImageFormat::Png, &options)
            .unwrap_err()
            .decompose().0;
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(buffer.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn unknown_format_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let image = Image::create(2, 2, crate::PixelFormat::Rgb8).unwrap();

        let err = image.save(&path).unwrap_err().decompose().0;
        assert!(matches!(err, ImageError::UnsupportedFormat(ImageFormat::Jpeg)));
        assert!(!path.exists());
    }

    #[test]
    fn save_needs_known_extension() {
        let image = Image::create(1, 1, crate::PixelFormat::Rgb8).unwrap();
        let err = image.save("out.unknown").unwrap_err().decompose().0;
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
