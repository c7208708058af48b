//! Animation model: ordered frames with display durations and a loop count.

use alloc::vec::Vec;

use crate::pixel::{PixelFormat, PixelStorage};

/// How many times an animation plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoopCount {
    /// Repeat forever.
    #[default]
    Infinite,
    /// Play this many additional times. `Finite(0)` plays once.
    Finite(u32),
}

/// One frame of an animation.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    /// Full-canvas pixels of this frame.
    pub pixels: PixelStorage,
    duration: f32,
}

fn clamp_duration(duration: f32) -> f32 {
    if duration.is_nan() { 0.0 } else { duration.max(0.0) }
}

impl AnimationFrame {
    /// Create a frame. Negative or NaN durations are clamped to zero.
    pub fn new(pixels: PixelStorage, duration: f32) -> Self {
        Self {
            pixels,
            duration: clamp_duration(duration),
        }
    }

    /// Display duration in seconds, never negative.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Replace the duration, clamping like [`new`](Self::new).
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = clamp_duration(duration);
    }
}

/// Ordered frames plus loop count. Owns every frame's pixel memory.
///
/// A zero-frame animation is valid; queries on it report no pixel format and
/// no bytes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
    frames: Vec<AnimationFrame>,
    loop_count: LoopCount,
}

impl Animation {
    /// Empty animation that loops forever.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty animation with room for `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
            loop_count: LoopCount::Infinite,
        }
    }

    /// Set the loop count.
    pub fn with_loop_count(mut self, loop_count: LoopCount) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Append a frame in display order.
    pub fn push(&mut self, frame: AnimationFrame) {
        self.frames.push(frame);
    }

    /// Frames in display order.
    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    /// Mutable frames in display order.
    pub fn frames_mut(&mut self) -> &mut [AnimationFrame] {
        &mut self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    pub fn set_loop_count(&mut self, loop_count: LoopCount) {
        self.loop_count = loop_count;
    }

    /// First frame, which stands in for the whole animation in byte and
    /// pixel queries.
    pub fn first(&self) -> Option<&AnimationFrame> {
        self.frames.first()
    }

    /// Pixel format of frame 0.
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        self.first().map(|frame| frame.pixels.format())
    }

    /// Sum of all frame durations in seconds.
    pub fn total_duration(&self) -> f32 {
        self.frames.iter().map(|frame| frame.duration).sum()
    }

    /// Take ownership of the frames.
    pub fn into_frames(self) -> Vec<AnimationFrame> {
        self.frames
    }
}

impl FromIterator<AnimationFrame> for Animation {
    fn from_iter<I: IntoIterator<Item = AnimationFrame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
            loop_count: LoopCount::Infinite,
        }
    }
}
