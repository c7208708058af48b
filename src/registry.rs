//! Ordered codec registry and format dispatch.
//!
//! Content detection probes codecs in registration order and the first one
//! that recognizes the stream wins. Overlapping signatures are therefore
//! resolved purely by order: register the stricter signature first.

use alloc::boxed::Box;
use alloc::vec::Vec;
use std::sync::OnceLock;

use log::{debug, trace};
use whereat::at;

use crate::codec::Codec;
use crate::error::Result;
use crate::format::ImageFormat;
use crate::stream::Stream;
use crate::ImageError;

/// Ordered collection of codecs.
///
/// [`Registry::builtin`] is built once per process and shared read-only.
/// Custom registries are built with [`Registry::empty`] and
/// [`Registry::with_codec`].
#[derive(Debug, Default)]
pub struct Registry {
    codecs: Vec<Box<dyn Codec>>,
}

impl Registry {
    /// No codecs. Every resolve fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fresh registry holding every compiled-in codec in probe order
    /// PNG, QOI, GIF.
    #[allow(unused_mut)]
    pub fn all() -> Self {
        let mut registry = Self::empty();

        #[cfg(feature = "png")]
        {
            registry = registry.with_codec(crate::codecs::png::PngCodec);
        }
        #[cfg(feature = "qoi")]
        {
            registry = registry.with_codec(crate::codecs::qoi::QoiCodec);
        }
        #[cfg(feature = "gif")]
        {
            registry = registry.with_codec(crate::codecs::gif::GifCodec);
        }

        registry
    }

    /// Process-wide registry of compiled-in codecs, built on first use.
    pub fn builtin() -> &'static Registry {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(Registry::all)
    }

    /// Append a codec after all existing ones.
    pub fn with_codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codecs.push(Box::new(codec));
        self
    }

    /// Remove every codec for `format`.
    pub fn without(mut self, format: ImageFormat) -> Self {
        self.codecs.retain(|codec| codec.format() != format);
        self
    }

    /// Codecs in probe order.
    pub fn codecs(&self) -> impl Iterator<Item = &dyn Codec> {
        self.codecs.iter().map(|codec| codec.as_ref())
    }

    /// Registered formats in probe order.
    pub fn formats(&self) -> impl Iterator<Item = ImageFormat> + '_ {
        self.codecs.iter().map(|codec| codec.format())
    }

    /// Whether a codec for `format` is registered.
    pub fn contains(&self, format: ImageFormat) -> bool {
        self.formats().any(|f| f == format)
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// First codec, in registration order, whose signature matches.
    ///
    /// The stream is rewound to 0 before every probe and again before
    /// returning, whatever the outcome. A probe I/O error aborts the search.
    pub fn resolve_by_content(&self, stream: &mut Stream<'_>) -> Result<&dyn Codec> {
        for codec in &self.codecs {
            stream.seek_to(0)?;
            let matched = codec.detect(stream);
            stream.seek_to(0)?;
            trace!("probe {:?}: {:?}", codec.format(), matched.as_ref().ok());
            if matched? {
                debug!("content resolved to {:?}", codec.format());
                return Ok(codec.as_ref());
            }
        }
        Err(at(ImageError::Unsupported))
    }

    /// Codec registered for exactly `format`.
    pub fn resolve_by_format(&self, format: ImageFormat) -> Result<&dyn Codec> {
        self.codecs
            .iter()
            .find(|codec| codec.format() == format)
            .map(|codec| codec.as_ref())
            .ok_or_else(|| at(ImageError::UnsupportedFormat(format)))
    }

    /// Format tag of [`resolve_by_content`](Self::resolve_by_content).
    pub fn detect_format(&self, stream: &mut Stream<'_>) -> Result<ImageFormat> {
        self.resolve_by_content(stream).map(|codec| codec.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DecodeContext, EncodeContext};
    use crate::image::Image;

    /// Matches any stream whose first byte is `magic`.
    struct ByteCodec {
        format: ImageFormat,
        magic: u8,
    }

    impl Codec for ByteCodec {
        fn format(&self) -> ImageFormat {
            self.format
        }

        fn detect(&self, stream: &mut Stream<'_>) -> Result<bool> {
            let mut byte = [0u8; 1];
            Ok(stream.read_up_to(&mut byte)? == 1 && byte[0] == self.magic)
        }

        fn decode(&self, _ctx: &DecodeContext<'_>, _stream: &mut Stream<'_>) -> Result<Image> {
            Ok(Image::empty(0, 0))
        }

        fn encode(
            &self,
            _ctx: &EncodeContext<'_>,
            _stream: &mut Stream<'_>,
            _image: &Image,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn two_codecs() -> Registry {
        Registry::empty()
            .with_codec(ByteCodec {
                format: ImageFormat::Bmp,
                magic: b'B',
            })
            .with_codec(ByteCodec {
                format: ImageFormat::Tga,
                magic: b'B',
            })
    }

    #[test]
    fn first_registered_wins_ties() {
        let registry = two_codecs();
        let data = *b"BM";
        let mut stream = Stream::from_slice(&data);
        for _ in 0..3 {
            let codec = registry.resolve_by_content(&mut stream).unwrap();
            assert_eq!(codec.format(), ImageFormat::Bmp);
            assert_eq!(stream.position().unwrap(), 0);
        }

        let registry = two_codecs().without(ImageFormat::Bmp);
        let codec = registry.resolve_by_content(&mut stream).unwrap();
        assert_eq!(codec.format(), ImageFormat::Tga);
    }

    #[test]
    fn no_match_is_unsupported() {
        let registry = two_codecs();
        let data = *b"xx";
        let mut stream = Stream::from_slice(&data);
        let err = registry
            .resolve_by_content(&mut stream)
            .unwrap_err()
            .decompose().0;
        assert!(matches!(err, ImageError::Unsupported));
        assert_eq!(stream.position().unwrap(), 0);

        let mut empty = Stream::from_slice(&[]);
        assert!(registry.resolve_by_content(&mut empty).is_err());
    }

    #[test]
    fn resolve_by_format() {
        let registry = two_codecs();
        assert_eq!(
            registry.resolve_by_format(ImageFormat::Tga).unwrap().format(),
            ImageFormat::Tga
        );
        let err = registry
            .resolve_by_format(ImageFormat::Jpeg)
            .unwrap_err()
            .decompose().0;
        assert!(matches!(err, ImageError::UnsupportedFormat(ImageFormat::Jpeg)));
    }

    #[test]
    fn empty_registry() {
        let registry = Registry::empty();
        assert!(registry.is_empty());
        let mut stream = Stream::from_slice(b"\x89PNG");
        assert!(registry.detect_format(&mut stream).is_err());
    }

    #[test]
    fn builtin_order() {
        let formats: Vec<_> = Registry::builtin().formats().collect();
        let mut expected = Vec::new();
        if cfg!(feature = "png") {
            expected.push(ImageFormat::Png);
        }
        if cfg!(feature = "qoi") {
            expected.push(ImageFormat::Qoi);
        }
        if cfg!(feature = "gif") {
            expected.push(ImageFormat::Gif);
        }
        assert_eq!(formats, expected);
        assert!(!Registry::builtin().contains(ImageFormat::Jpeg));
    }
}
