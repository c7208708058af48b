#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zenio::{EncoderOptions, Image, ImageFormat, PixelFormat};

#[derive(Debug, Arbitrary)]
struct Input {
    width: u8,
    height: u8,
    alpha: bool,
    lossless_png: bool,
    seed: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let (width, height) = (usize::from(input.width), usize::from(input.height));
    let format = if input.alpha {
        PixelFormat::Rgba8
    } else {
        PixelFormat::Rgb8
    };
    let len = width * height * format.bytes_per_pixel();
    if input.seed.is_empty() || len == 0 {
        return;
    }
    let bytes: Vec<u8> = input.seed.iter().copied().cycle().take(len).collect();
    let Ok(image) = Image::from_raw_pixels(width, height, &bytes, format) else {
        return;
    };

    let target = if input.lossless_png {
        ImageFormat::Png
    } else {
        ImageFormat::Qoi
    };
    let encoded = image
        .write_to_vec(target, &EncoderOptions::default())
        .expect("lossless encode of a valid image");
    let decoded = Image::from_memory(&encoded).expect("decode of our own output");
    assert_eq!(decoded.raw_bytes(), image.raw_bytes());
});
