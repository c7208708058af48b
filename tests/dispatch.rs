//! Content probing, registration order, and format lookup.

use zenio::{
    Codec, DecodeContext, DecodeRequest, EncodeContext, EncodeRequest, EncoderOptions, ErrorKind,
    Image, ImageError, ImageFormat, Limits, PixelFormat, Registry, Result, Stream,
};

/// Claims any stream starting with `prefix` and decodes it as a 1×1 gray
/// image whose value identifies the codec.
struct PrefixCodec {
    format: ImageFormat,
    prefix: &'static [u8],
    marker: u8,
}

impl Codec for PrefixCodec {
    fn format(&self) -> ImageFormat {
        self.format
    }

    fn detect(&self, stream: &mut Stream<'_>) -> Result<bool> {
        let mut buf = vec![0u8; self.prefix.len()];
        let n = stream.read_up_to(&mut buf)?;
        Ok(n == buf.len() && buf == self.prefix)
    }

    fn decode(&self, ctx: &DecodeContext<'_>, stream: &mut Stream<'_>) -> Result<Image> {
        assert_eq!(stream.position()?, 0, "decode must start at offset 0");
        let mut pixels = ctx.alloc_pixels(1, 1, PixelFormat::Gray8)?;
        pixels.as_bytes_mut()[0] = self.marker;
        Image::from_pixels(1, 1, pixels)
    }

    fn encode(&self, _ctx: &EncodeContext<'_>, stream: &mut Stream<'_>, image: &Image) -> Result<()> {
        assert!(!image.is_empty());
        stream.write_bytes(self.prefix)?;
        Ok(())
    }
}

fn overlapping() -> Registry {
    Registry::empty()
        .with_codec(PrefixCodec {
            format: ImageFormat::Tga,
            prefix: b"AB",
            marker: 1,
        })
        .with_codec(PrefixCodec {
            format: ImageFormat::Bmp,
            prefix: b"A",
            marker: 2,
        })
}

fn marker(image: &Image) -> u8 {
    image.raw_bytes()[0]
}

#[test]
fn stricter_signature_first_wins() {
    let registry = overlapping();
    let request = DecodeRequest::new().with_registry(&registry);

    assert_eq!(marker(&request.decode_memory(b"ABC").unwrap()), 1);
    assert_eq!(marker(&request.decode_memory(b"AC").unwrap()), 2);

    // Reversed order: the looser signature shadows the stricter one.
    let reversed = Registry::empty()
        .with_codec(PrefixCodec {
            format: ImageFormat::Bmp,
            prefix: b"A",
            marker: 2,
        })
        .with_codec(PrefixCodec {
            format: ImageFormat::Tga,
            prefix: b"AB",
            marker: 1,
        });
    let request = DecodeRequest::new().with_registry(&reversed);
    assert_eq!(marker(&request.decode_memory(b"ABC").unwrap()), 2);
}

#[test]
fn detection_is_deterministic_and_rewinds() {
    let registry = overlapping();
    let data = b"ABCDEF";
    let mut stream = Stream::from_slice(data);
    stream.seek_to(4).unwrap();

    for _ in 0..5 {
        assert_eq!(registry.detect_format(&mut stream).unwrap(), ImageFormat::Tga);
        assert_eq!(stream.position().unwrap(), 0);
    }
}

#[test]
fn unrecognized_content_is_unsupported() {
    let registry = overlapping();
    let err = DecodeRequest::new()
        .with_registry(&registry)
        .decode_memory(b"ZZZ")
        .unwrap_err()
        .decompose().0;
    assert!(matches!(err, ImageError::Unsupported));
    assert_eq!(err.kind(), ErrorKind::Unsupported);

    let err = DecodeRequest::new()
        .with_registry(&registry)
        .decode_memory(b"")
        .unwrap_err()
        .decompose().0;
    assert!(matches!(err, ImageError::Unsupported));
}

#[test]
fn unregistered_format_is_unsupported_on_write() {
    let image = Image::create(2, 2, PixelFormat::Rgb8).unwrap();
    let err = image
        .write_to_vec(ImageFormat::Jpeg, &EncoderOptions::default())
        .unwrap_err()
        .decompose().0;
    assert!(matches!(err, ImageError::UnsupportedFormat(ImageFormat::Jpeg)));
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn custom_registry_encodes() {
    let registry = overlapping().without(ImageFormat::Tga);
    assert_eq!(registry.formats().collect::<Vec<_>>(), [ImageFormat::Bmp]);

    let image = Image::create(1, 1, PixelFormat::Gray8).unwrap();
    let bytes = EncodeRequest::new(ImageFormat::Bmp)
        .with_registry(&registry)
        .encode_to_vec(&image)
        .unwrap();
    assert_eq!(bytes, b"A");

    let err = EncodeRequest::new(ImageFormat::Tga)
        .with_registry(&registry)
        .encode_to_vec(&image)
        .unwrap_err()
        .decompose().0;
    assert!(matches!(err, ImageError::UnsupportedFormat(ImageFormat::Tga)));
}

#[test]
fn limits_reach_the_codec() {
    let registry = overlapping();
    let limits = Limits::none().with_max_memory_bytes(0);
    let err = DecodeRequest::new()
        .with_registry(&registry)
        .with_limits(&limits)
        .decode_memory(b"AB")
        .unwrap_err()
        .decompose().0;
    assert!(matches!(err, ImageError::LimitExceeded(_)));
    assert_eq!(err.kind(), ErrorKind::Allocation);
}

#[cfg(all(feature = "png", feature = "qoi", feature = "gif"))]
#[test]
fn builtin_detects_each_format() {
    let image = Image::create(3, 3, PixelFormat::Rgba8).unwrap();
    let options = EncoderOptions::default();
    for format in [ImageFormat::Png, ImageFormat::Qoi, ImageFormat::Gif] {
        let bytes = image.write_to_vec(format, &options).unwrap();
        let mut stream = Stream::from_slice(&bytes);
        assert_eq!(Registry::builtin().detect_format(&mut stream).unwrap(), format);
    }
}

#[cfg(feature = "png")]
#[test]
fn claimed_stream_errors_are_final() {
    // A PNG signature followed by garbage: PNG claims it, decode fails, and
    // nothing else is tried.
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(&[0xFF; 32]);
    let err = Image::from_memory(&data).unwrap_err().decompose().0;
    assert!(!matches!(err, ImageError::Unsupported));
}
