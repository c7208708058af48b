//! Per-format encoder options.
//!
//! [`EncoderOptions`] bundles optional per-format settings into one value
//! that the write path hands to whichever codec it resolves. A codec reads
//! only its own field and ignores the rest; `None` means codec defaults.

/// PNG settings, re-exported from the `png` crate.
#[cfg(feature = "png")]
pub mod png_codec {
    pub use png::{Compression, Filter};
}

/// PNG encoder options.
#[cfg(feature = "png")]
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct PngOptions {
    /// Deflate effort.
    pub compression: Option<png::Compression>,
    /// Row filter strategy.
    pub filter: Option<png::Filter>,
}

#[cfg(feature = "png")]
impl PngOptions {
    pub fn with_compression(mut self, compression: png::Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn with_filter(mut self, filter: png::Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// GIF encoder options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct GifOptions {
    /// NeuQuant sampling speed, 1 (best) to 30 (fastest). Default 10.
    pub speed: Option<i32>,
    /// Overrides the image's own loop count.
    pub loop_count: Option<crate::LoopCount>,
}

impl GifOptions {
    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = Some(speed.clamp(1, 30));
        self
    }

    pub fn with_loop_count(mut self, loop_count: crate::LoopCount) -> Self {
        self.loop_count = Some(loop_count);
        self
    }
}

/// Colorspace tag written into a QOI header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QoiColorspace {
    /// sRGB with linear alpha.
    #[default]
    Srgb,
    /// All channels linear.
    Linear,
}

/// QOI encoder options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct QoiOptions {
    pub colorspace: Option<QoiColorspace>,
}

impl QoiOptions {
    pub fn with_colorspace(mut self, colorspace: QoiColorspace) -> Self {
        self.colorspace = Some(colorspace);
        self
    }
}

/// Format-specific encoder overrides.
///
/// # Example
///
/// ```
/// use zenio::config::{EncoderOptions, GifOptions};
///
/// let options = EncoderOptions::default().with_gif(GifOptions::default().with_speed(1));
/// assert_eq!(options.gif.unwrap().speed, Some(1));
/// ```
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct EncoderOptions {
    #[cfg(feature = "png")]
    pub png: Option<PngOptions>,
    pub gif: Option<GifOptions>,
    pub qoi: Option<QoiOptions>,
}

impl EncoderOptions {
    /// Codec defaults for every format.
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "png")]
    pub fn with_png(mut self, options: PngOptions) -> Self {
        self.png = Some(options);
        self
    }

    pub fn with_gif(mut self, options: GifOptions) -> Self {
        self.gif = Some(options);
        self
    }

    pub fn with_qoi(mut self, options: QoiOptions) -> Self {
        self.qoi = Some(options);
        self
    }
}
