#![no_main]

use libfuzzer_sys::fuzz_target;
use zenio::Image;

fuzz_target!(|data: &[u8]| {
    if let Ok(image) = Image::from_memory(data) {
        // Queries must hold for anything a codec accepts.
        let _ = image.pixel_format();
        let _ = image.row_byte_size();
        assert_eq!(image.iter().len(), image.pixels().map_or(0, |p| p.len()));
    }
});
