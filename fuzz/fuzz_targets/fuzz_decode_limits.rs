#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zenio::{DecodeRequest, Limits};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    max_pixels: u16,
    max_frames: u8,
    data: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let limits = Limits::none()
        .with_max_pixels(u64::from(input.max_pixels))
        .with_max_frames(u64::from(input.max_frames));
    if let Ok(image) = DecodeRequest::new()
        .with_limits(&limits)
        .with_stop(&enough::Unstoppable)
        .decode_memory(input.data)
    {
        let (w, h) = image.dimensions();
        assert!((w as u64) * (h as u64) <= u64::from(input.max_pixels));
        assert!(image.frame_count() as u64 <= u64::from(input.max_frames).max(1));
    }
});
