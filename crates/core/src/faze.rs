//! Faze module - frame counter to animation glyph mapping
//!
//! A faze owns a counter that wraps at `max_frame` and an immutable glyph
//! sequence. The counter is spread over the sequence proportionally, so an
//! animation of 4 glyphs over 18 frames shows each glyph for 4 or 5 frames.

use crate::rng::SimpleRng;

/// Animation cycler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faze {
    /// `None` pins the animation to its first glyph.
    frame: Option<u32>,
    max_frame: u32,
    animation: &'static [&'static str],
}

impl Faze {
    /// A running animation starting at frame 0.
    pub fn new(max_frame: u32, animation: &'static [&'static str]) -> Self {
        Self {
            frame: Some(0),
            max_frame: max_frame.max(1),
            animation,
        }
    }

    /// A static animation that always shows its first glyph.
    pub fn fixed(animation: &'static [&'static str]) -> Self {
        Self {
            frame: None,
            max_frame: 1,
            animation,
        }
    }

    pub fn frame(&self) -> Option<u32> {
        self.frame
    }

    pub fn max_frame(&self) -> u32 {
        self.max_frame
    }

    pub fn animation(&self) -> &'static [&'static str] {
        self.animation
    }

    /// True once the counter has been advanced exactly `max_frame` times
    /// since it last wrapped.
    pub fn is_complete(&self) -> bool {
        self.frame == Some(self.max_frame)
    }

    /// Return the glyph for the current frame, then advance the counter.
    pub fn get_frame(&mut self) -> &'static str {
        let Some(mut frame) = self.frame else {
            return self.glyph(0);
        };
        if frame >= self.max_frame {
            frame = 0;
        }
        let idx = self.index_of(frame);
        self.frame = Some(frame + 1);
        self.glyph(idx)
    }

    /// Jump to a uniformly random frame in `[0, max_frame]` and return its glyph.
    pub fn get_random_frame(&mut self, rng: &mut SimpleRng) -> &'static str {
        if self.frame.is_none() {
            return self.glyph(0);
        }
        let frame = rng.range_inclusive(0, self.max_frame);
        self.frame = Some(frame);
        self.glyph(self.index_of(frame))
    }

    fn index_of(&self, frame: u32) -> usize {
        let len = self.animation.len();
        let idx = (frame as usize * len) / self.max_frame as usize;
        // frame == max_frame (random variant) lands one past the end.
        idx.min(len.saturating_sub(1))
    }

    fn glyph(&self, idx: usize) -> &'static str {
        self.animation.get(idx).copied().unwrap_or("")
    }
}
