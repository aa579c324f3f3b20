#![forbid(unsafe_code)]

//! Rasterizer seam.
//!
//! Font file parsing and glyph rasterization live outside this crate. A
//! [`GlyphSource`] hands over one alpha bitmap per codepoint and the font's
//! vertical metrics; everything else (packing, paging, measuring) happens here.

/// Vertical font metrics in pixels at a given size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerticalMetrics {
    /// Distance from baseline to the top of the tallest glyph (positive).
    pub ascent: f32,
    /// Distance from baseline to the bottom of the lowest glyph (negative).
    pub descent: f32,
    pub line_gap: f32,
}

impl VerticalMetrics {
    /// Line height rounded to whole pixels.
    #[inline]
    pub fn line_height(&self) -> i32 {
        (self.ascent - self.descent + self.line_gap + 0.5).floor() as i32
    }
}

/// A rasterized glyph: R8 alpha bitmap plus placement.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRaster {
    pub width: u16,
    pub height: u16,
    /// Row-major alpha values, `width * height` bytes.
    pub pixels: Vec<u8>,
    /// Horizontal offset from the pen position to the bitmap's left edge.
    pub x_offset: f32,
    /// Vertical offset from the baseline to the bitmap's top edge.
    pub y_offset: f32,
    /// Pen advance after this glyph.
    pub advance: f32,
}

impl GlyphRaster {
    /// An invisible glyph that only advances the pen.
    pub fn blank(advance: f32) -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            x_offset: 0.0,
            y_offset: 0.0,
            advance,
        }
    }

    /// Check that the bitmap length matches the declared dimensions.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.width as usize * self.height as usize == self.pixels.len()
    }
}

/// Source of glyph bitmaps for one font face.
pub trait GlyphSource {
    /// Vertical metrics at `px_size`.
    fn vertical_metrics(&self, px_size: f32) -> VerticalMetrics;

    /// Rasterize `codepoint` at `px_size`.
    ///
    /// Returns `None` when the face has no glyph for the codepoint; the page
    /// then holds an empty, zero-advance entry.
    fn rasterize(&self, codepoint: u32, px_size: f32) -> Option<GlyphRaster>;
}

/// Deterministic synthetic face: every printable codepoint is a solid box.
///
/// Used by tests and the headless harness where no real font is available.
/// Advances are fixed, so measured widths are exact multiples of `advance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceSource {
    advance: f32,
}

impl MonospaceSource {
    /// A face whose every glyph advances by `advance` pixels.
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }

    /// Per-glyph advance.
    #[inline]
    pub fn advance(&self) -> f32 {
        self.advance
    }
}

impl GlyphSource for MonospaceSource {
    fn vertical_metrics(&self, px_size: f32) -> VerticalMetrics {
        VerticalMetrics {
            ascent: px_size * 0.8,
            descent: -px_size * 0.2,
            line_gap: 0.0,
        }
    }

    fn rasterize(&self, codepoint: u32, px_size: f32) -> Option<GlyphRaster> {
        let ch = char::from_u32(codepoint)?;
        if ch.is_control() {
            return Some(GlyphRaster::blank(self.advance));
        }
        let width = (self.advance * 0.8).floor().max(1.0) as u16;
        let height = (px_size * 0.8).floor().max(1.0) as u16;
        Some(GlyphRaster {
            width,
            height,
            pixels: vec![0xFF; width as usize * height as usize],
            x_offset: ((self.advance - width as f32) / 2.0).floor(),
            y_offset: -(px_size * 0.8),
            advance: self.advance,
        })
    }
}
