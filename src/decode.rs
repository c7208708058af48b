//! Read orchestration: open a stream, resolve a codec by content, decode.

use std::fs::File;
use std::path::Path;

use enough::Stop;
use log::debug;

use crate::codec::DecodeContext;
use crate::error::{Result, ResultExt};
use crate::image::Image;
use crate::limits::Limits;
use crate::registry::Registry;
use crate::stream::Stream;

/// Image decode request builder.
///
/// Defaults to the built-in registry, no limits, and no cancellation.
///
/// # Example
///
/// ```no_run
/// use zenio::{DecodeRequest, Limits};
///
/// let limits = Limits::none().with_max_pixels(16_000_000);
/// let image = DecodeRequest::new()
///     .with_limits(&limits)
///     .decode_file_path("photo.png")?;
/// println!("{}x{}", image.width(), image.height());
/// # Ok::<(), whereat::At<zenio::ImageError>>(())
/// ```
#[derive(Clone, Copy)]
pub struct DecodeRequest<'a> {
    registry: Option<&'a Registry>,
    limits: Option<&'a Limits>,
    stop: Option<&'a dyn Stop>,
}

impl Default for DecodeRequest<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DecodeRequest<'a> {
    pub fn new() -> Self {
        Self {
            registry: None,
            limits: None,
            stop: None,
        }
    }

    /// Probe and decode with this registry instead of the built-in one.
    pub fn with_registry(mut self, registry: &'a Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set resource limits.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Set a cancellation token.
    pub fn with_stop(mut self, stop: &'a dyn Stop) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Open `path` read-only and decode it.
    pub fn decode_file_path(self, path: impl AsRef<Path>) -> Result<Image> {
        let file = File::open(path.as_ref()).or_at()?;
        self.decode_file(file)
    }

    /// Decode from an open file, starting at offset 0.
    pub fn decode_file(self, file: File) -> Result<Image> {
        self.decode_stream(&mut Stream::from_file(file))
    }

    /// Decode from an in-memory buffer.
    pub fn decode_memory(self, data: &[u8]) -> Result<Image> {
        self.decode_stream(&mut Stream::from_slice(data))
    }

    /// Resolve a codec by content and decode.
    ///
    /// Errors from probing, `Unsupported`, and decode errors of the claiming
    /// codec propagate unchanged. No other codec is tried after a claim.
    pub fn decode_stream(self, stream: &mut Stream<'_>) -> Result<Image> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => Registry::builtin(),
        };
        let limits = Limits::none();
        let limits = self.limits.unwrap_or(&limits);
        let stop: &dyn Stop = self.stop.unwrap_or(&enough::Unstoppable);

        stop.check().or_at()?;
        let codec = registry.resolve_by_content(stream)?;

        stream.seek_to(0)?;
        let ctx = DecodeContext::new(limits, stop);
        let image = codec.decode(&ctx, stream)?;
        debug!(
            "decoded {:?} {}x{} ({} frames)",
            codec.format(),
            image.width(),
            image.height(),
            image.frame_count()
        );
        Ok(image)
    }
}

impl Image {
    /// Decode the file at `path` with the built-in registry.
    pub fn from_file_path(path: impl AsRef<Path>) -> Result<Self> {
        DecodeRequest::new().decode_file_path(path)
    }

    /// Decode an open file with the built-in registry.
    pub fn from_file(file: File) -> Result<Self> {
        DecodeRequest::new().decode_file(file)
    }

    /// Decode an in-memory buffer with the built-in registry.
    pub fn from_memory(data: &[u8]) -> Result<Self> {
        DecodeRequest::new().decode_memory(data)
    }

    /// Decode a caller-built stream with the built-in registry.
    pub fn from_stream(stream: &mut Stream<'_>) -> Result<Self> {
        DecodeRequest::new().decode_stream(stream)
    }
}
