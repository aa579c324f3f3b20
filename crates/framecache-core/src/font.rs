#![forbid(unsafe_code)]

//! Font handles and the text measurement seam.
//!
//! Fonts are owned by an external provider. Everything in the cache refers to
//! them through [`FontId`], a small generational handle into the provider's
//! arena. Hashing the handle instead of a memory address keeps cell hashes
//! deterministic across runs and immune to address reuse.

use crate::color::Color;

/// Opaque generational handle to a font owned by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId {
    index: u32,
    generation: u32,
}

impl FontId {
    /// Create a handle from raw arena coordinates.
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation. Bumped every time the slot is reused.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Stable byte encoding used for hashing and command records.
    #[inline]
    pub fn to_le_bytes(self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[..4].copy_from_slice(&self.index.to_le_bytes());
        out[4..].copy_from_slice(&self.generation.to_le_bytes());
        out
    }

    /// Inverse of [`FontId::to_le_bytes`].
    #[inline]
    pub fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self {
            index: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            generation: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }
}

/// A positioned run of text handed to a backend for drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun<'a> {
    pub font: FontId,
    pub text: &'a str,
    pub x: i32,
    pub y: i32,
    pub color: Color,
    /// Tab advance in pixels captured when the run was recorded.
    pub tab_width: i32,
}

/// Text measurement provided by whoever owns the fonts.
///
/// Every method returns `None` when `font` does not refer to a live font.
pub trait TextMetrics {
    /// Total advance width of `text` in pixels.
    fn text_width(&mut self, font: FontId, text: &str) -> Option<i32>;

    /// Line height of `font` in pixels.
    fn text_height(&self, font: FontId) -> Option<i32>;

    /// Current tab advance of `font` in pixels.
    fn tab_width(&mut self, font: FontId) -> Option<i32>;
}
