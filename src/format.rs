//! Image format tags and static format metadata.
//!
//! Content detection does not live here: each codec answers "is this you?"
//! through [`Codec::detect`](crate::Codec::detect), and the
//! [`Registry`](crate::Registry) decides the probe order.

/// Supported image formats.
///
/// The set is closed per build. A tag without a compiled-in codec is still
/// representable, but resolving it yields
/// [`ImageError::UnsupportedFormat`](crate::ImageError::UnsupportedFormat).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Bmp,
    Gif,
    Jpeg,
    Png,
    Qoi,
    Tga,
}

impl ImageFormat {
    /// Every format tag, in declaration order.
    pub const ALL: [ImageFormat; 6] = [
        ImageFormat::Bmp,
        ImageFormat::Gif,
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Qoi,
        ImageFormat::Tga,
    ];

    /// Detect format from file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }

    /// Detect format from the extension of a path.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Qoi => "image/qoi",
            ImageFormat::Tga => "image/x-tga",
        }
    }

    /// Common file extensions, preferred one first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Bmp => &["bmp", "dib"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            ImageFormat::Png => &["png"],
            ImageFormat::Qoi => &["qoi"],
            ImageFormat::Tga => &["tga", "icb", "vda", "vst"],
        }
    }

    /// Whether this format can hold more than one frame.
    pub fn supports_animation(self) -> bool {
        match self {
            ImageFormat::Gif => true,
            ImageFormat::Png => false, // APNG exists but we don't support it
            ImageFormat::Bmp | ImageFormat::Jpeg | ImageFormat::Qoi | ImageFormat::Tga => false,
        }
    }

    /// Whether this format supports an alpha channel.
    pub fn supports_alpha(self) -> bool {
        match self {
            ImageFormat::Jpeg => false,
            ImageFormat::Bmp
            | ImageFormat::Gif
            | ImageFormat::Png
            | ImageFormat::Qoi
            | ImageFormat::Tga => true,
        }
    }
}
