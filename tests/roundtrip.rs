//! Encode-then-decode through the public write and read paths.

#![cfg(all(feature = "png", feature = "gif", feature = "qoi"))]

use zenio::{
    Animation, AnimationFrame, EncoderOptions, Image, ImageFormat, LoopCount, PixelFormat,
    PixelStorage,
};

fn gradient(width: usize, height: usize, format: PixelFormat) -> Image {
    let len = width * height * format.bytes_per_pixel();
    let bytes: Vec<u8> = (0..len).map(|i| (i * 7 % 251) as u8).collect();
    Image::from_raw_pixels(width, height, &bytes, format).unwrap()
}

#[test]
fn png_lossless_for_native_layouts() {
    let options = EncoderOptions::default();
    for format in [
        PixelFormat::Gray8,
        PixelFormat::Gray16,
        PixelFormat::GrayAlpha8,
        PixelFormat::GrayAlpha16,
        PixelFormat::Rgb8,
        PixelFormat::Rgb16,
        PixelFormat::Rgba8,
        PixelFormat::Rgba16,
    ] {
        let image = gradient(9, 5, format);
        let bytes = image.write_to_vec(ImageFormat::Png, &options).unwrap();
        let decoded = Image::from_memory(&bytes).unwrap();

        assert_eq!(decoded.dimensions(), (9, 5), "{format:?}");
        assert_eq!(decoded.pixel_format(), Some(format), "{format:?}");
        assert_eq!(decoded.raw_bytes(), image.raw_bytes(), "{format:?}");
    }
}

#[test]
fn qoi_lossless() {
    let options = EncoderOptions::default();
    for format in [PixelFormat::Rgb8, PixelFormat::Rgba8] {
        let image = gradient(16, 3, format);
        let bytes = image.write_to_vec(ImageFormat::Qoi, &options).unwrap();
        let decoded = Image::from_memory(&bytes).unwrap();
        assert_eq!(decoded, image, "{format:?}");
    }
}

#[test]
fn gif_still_is_rgba8() {
    let pixels = PixelStorage::from_bytes(
        PixelFormat::Rgb8,
        &[255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
    )
    .unwrap();
    let image = Image::from_pixels(2, 2, pixels).unwrap();

    let bytes = image
        .write_to_vec(ImageFormat::Gif, &EncoderOptions::default())
        .unwrap();
    let decoded = Image::from_memory(&bytes).unwrap();

    assert!(!decoded.is_animation());
    assert_eq!(decoded.pixel_format(), Some(PixelFormat::Rgba8));
    assert_eq!(
        decoded.raw_bytes(),
        &[255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 255]
    );
}

#[test]
fn gif_animation_preserves_timing() {
    let colors: [[u8; 4]; 3] = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]];
    let durations = [0.1f32, 0.2, 0.3];

    let mut animation = Animation::new().with_loop_count(LoopCount::Infinite);
    for (color, duration) in colors.iter().zip(durations) {
        let bytes: Vec<u8> = color.repeat(6);
        let pixels = PixelStorage::from_bytes(PixelFormat::Rgba8, &bytes).unwrap();
        animation.push(AnimationFrame::new(pixels, duration));
    }
    let image = Image::from_animation(3, 2, animation).unwrap();

    let bytes = image
        .write_to_vec(ImageFormat::Gif, &EncoderOptions::default())
        .unwrap();
    let decoded = Image::from_memory(&bytes).unwrap();

    assert!(decoded.is_animation());
    assert_eq!(decoded.frame_count(), 3);
    let animation = decoded.animation().unwrap();
    assert_eq!(animation.loop_count(), LoopCount::Infinite);
    for (i, frame) in animation.frames().iter().enumerate() {
        assert_eq!(frame.duration(), durations[i], "frame {i} duration");
        assert_eq!(frame.pixels.as_bytes(), colors[i].repeat(6), "frame {i} pixels");
    }

    // Queries report frame 0.
    assert_eq!(decoded.raw_bytes(), colors[0].repeat(6));
    let first = decoded.iter().next().unwrap();
    assert_eq!((first.r, first.g, first.b, first.a), (1.0, 0.0, 0.0, 1.0));
    assert_eq!(decoded.iter().count(), 6);
}

#[test]
fn file_path_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradient.png");
    let image = gradient(12, 12, PixelFormat::Rgba8);

    image.save(&path).unwrap();
    let decoded = Image::from_file_path(&path).unwrap();
    assert_eq!(decoded, image);

    let file = std::fs::File::open(&path).unwrap();
    let decoded = Image::from_file(file).unwrap();
    assert_eq!(decoded, image);
}

#[test]
fn write_to_open_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.qoi");
    let image = gradient(4, 4, PixelFormat::Rgb8);

    let file = std::fs::File::create(&path).unwrap();
    image
        .write_to_file(file, ImageFormat::Qoi, &EncoderOptions::default())
        .unwrap();

    assert_eq!(Image::from_file_path(&path).unwrap(), image);
}
