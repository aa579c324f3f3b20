#![forbid(unsafe_code)]

//! Code-page atlas baking.
//!
//! A [`GlyphPage`] holds the 256 glyphs of one code page packed into a single
//! R8 atlas. Packing uses a shelf allocator: glyphs are placed left to right,
//! and a new shelf starts when the row is full. If the page does not fit, the
//! atlas doubles in both dimensions and packing restarts from scratch.

use tracing::debug;

use crate::config::GlyphConfig;
use crate::error::GlyphError;
use crate::source::{GlyphRaster, GlyphSource};

/// Codepoints per page.
pub const PAGE_SIZE: u32 = 256;

/// Atlas side lengths stop doubling here.
const MAX_ATLAS_SIDE: u32 = 1 << 15;

/// Rect within an atlas (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// R8 alpha atlas backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl AtlasBitmap {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize],
        }
    }

    #[must_use]
    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Alpha value at (x, y), or `None` if out of bounds.
    #[must_use]
    pub fn alpha(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    fn blit(&mut self, dst: AtlasRect, src: &[u8]) {
        let atlas_w = self.width as usize;
        let w = dst.w as usize;
        for row in 0..dst.h as usize {
            let dst_row = (dst.y as usize + row) * atlas_w + dst.x as usize;
            let src_row = row * w;
            self.pixels[dst_row..dst_row + w].copy_from_slice(&src[src_row..src_row + w]);
        }
    }
}

/// A glyph placed in its page's atlas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BakedGlyph {
    /// Bitmap location. `w == 0` for invisible glyphs.
    pub rect: AtlasRect,
    pub x_offset: f32,
    /// Offset from the line top (ascent already applied).
    pub y_offset: f32,
    /// Pen advance, floored to whole pixels.
    pub advance: f32,
}

impl BakedGlyph {
    /// Advance in whole pixels.
    #[inline]
    pub fn advance_px(&self) -> i32 {
        self.advance as i32
    }
}

/// One baked code page.
#[derive(Debug, Clone)]
pub struct GlyphPage {
    index: u32,
    atlas: AtlasBitmap,
    glyphs: Vec<BakedGlyph>,
}

/// Shelf allocator state for one packing attempt.
struct Shelf {
    width: u32,
    height: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_h: u32,
}

impl Shelf {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
            row_h: 0,
        }
    }

    fn alloc(&mut self, w: u32, h: u32) -> Option<AtlasRect> {
        if self.cursor_x.saturating_add(w) > self.width {
            self.cursor_x = 0;
            self.cursor_y = self.cursor_y.saturating_add(self.row_h);
            self.row_h = 0;
        }
        if self.cursor_x.saturating_add(w) > self.width
            || self.cursor_y.saturating_add(h) > self.height
        {
            return None;
        }
        let slot = AtlasRect {
            x: self.cursor_x,
            y: self.cursor_y,
            w,
            h,
        };
        self.cursor_x += w;
        self.row_h = self.row_h.max(h);
        Some(slot)
    }
}

impl GlyphPage {
    /// Rasterize and pack code page `index`.
    ///
    /// Returns the page and the number of overflow retries it took.
    pub fn bake(
        source: &dyn GlyphSource,
        px_size: f32,
        index: u32,
        config: &GlyphConfig,
    ) -> Result<(Self, u32), GlyphError> {
        let first = index.saturating_mul(PAGE_SIZE);
        let mut rasters = Vec::with_capacity(PAGE_SIZE as usize);
        for offset in 0..PAGE_SIZE {
            let codepoint = first + offset;
            let raster = match source.rasterize(codepoint, px_size) {
                Some(r) if !r.is_consistent() => {
                    return Err(GlyphError::InvalidRaster { codepoint });
                }
                Some(r) => Some(r),
                None => None,
            };
            rasters.push(raster);
        }

        let ascent = (source.vertical_metrics(px_size).ascent + 0.5).floor();
        let mut side = config.initial_atlas_size.max(1);
        let mut retries = 0u32;
        loop {
            if let Some(page) = Self::pack(index, &rasters, side, config.padding, ascent) {
                debug!(page = index, side, retries, "glyph page baked");
                return Ok((page, retries));
            }
            if side >= MAX_ATLAS_SIDE {
                return Err(GlyphError::AtlasOverflow { page: index, side });
            }
            side *= 2;
            retries += 1;
            debug!(page = index, side, "glyph page overflowed atlas, retrying larger");
        }
    }

    fn pack(
        index: u32,
        rasters: &[Option<GlyphRaster>],
        side: u32,
        padding: u32,
        ascent: f32,
    ) -> Option<Self> {
        let mut shelf = Shelf::new(side, side);
        let mut atlas = AtlasBitmap::new(side, side);
        let mut glyphs = Vec::with_capacity(rasters.len());

        for (offset, raster) in rasters.iter().enumerate() {
            let Some(raster) = raster else {
                glyphs.push(BakedGlyph::default());
                continue;
            };
            let (w, h) = (raster.width as u32, raster.height as u32);
            let rect = if w == 0 || h == 0 {
                AtlasRect::default()
            } else {
                let slot = shelf.alloc(w + 2 * padding, h + 2 * padding)?;
                let draw = AtlasRect {
                    x: slot.x + padding,
                    y: slot.y + padding,
                    w,
                    h,
                };
                atlas.blit(draw, &raster.pixels);
                draw
            };
            let mut glyph = BakedGlyph {
                rect,
                x_offset: raster.x_offset,
                y_offset: raster.y_offset + ascent,
                advance: raster.advance.floor(),
            };
            let codepoint = index * PAGE_SIZE + offset as u32;
            if codepoint == '\t' as u32 || codepoint == '\n' as u32 {
                glyph.rect.w = 0;
            }
            glyphs.push(glyph);
        }

        Some(Self {
            index,
            atlas,
            glyphs,
        })
    }

    /// Code page number (`codepoint >> 8`).
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn atlas(&self) -> &AtlasBitmap {
        &self.atlas
    }

    /// Glyph for the low byte of a codepoint on this page.
    #[inline]
    pub fn glyph(&self, codepoint: u32) -> BakedGlyph {
        self.glyphs
            .get((codepoint % PAGE_SIZE) as usize)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MonospaceSource, VerticalMetrics};

    /// Face with huge glyphs on every codepoint so that even 256x256 overflows.
    struct Chunky;

    impl GlyphSource for Chunky {
        fn vertical_metrics(&self, _px_size: f32) -> VerticalMetrics {
            VerticalMetrics {
                ascent: 30.0,
                descent: -10.0,
                line_gap: 0.0,
            }
        }

        fn rasterize(&self, _codepoint: u32, _px_size: f32) -> Option<GlyphRaster> {
            Some(GlyphRaster {
                width: 30,
                height: 30,
                pixels: vec![0x80; 900],
                x_offset: 0.0,
                y_offset: -30.0,
                advance: 32.7,
            })
        }
    }

    struct Broken;

    impl GlyphSource for Broken {
        fn vertical_metrics(&self, _px_size: f32) -> VerticalMetrics {
            VerticalMetrics::default()
        }

        fn rasterize(&self, _codepoint: u32, _px_size: f32) -> Option<GlyphRaster> {
            Some(GlyphRaster {
                width: 4,
                height: 4,
                pixels: vec![0; 3],
                x_offset: 0.0,
                y_offset: 0.0,
                advance: 4.0,
            })
        }
    }

    #[test]
    fn overflow_doubles_until_page_fits() {
        let (page, retries) = GlyphPage::bake(&Chunky, 40.0, 0, &GlyphConfig::default()).unwrap();
        // 256 glyphs of 32x32 slots need at least 512x512.
        assert!(retries >= 2);
        let (w, h) = page.atlas().dims();
        assert_eq!(w, h);
        assert_eq!(w, 128 << retries);
    }

    #[test]
    fn advances_are_floored_and_offsets_include_ascent() {
        let (page, _) = GlyphPage::bake(&Chunky, 40.0, 1, &GlyphConfig::default()).unwrap();
        let g = page.glyph(0x141);
        assert_eq!(g.advance, 32.0);
        assert_eq!(g.y_offset, 0.0);
        assert_eq!(page.index(), 1);
    }

    #[test]
    fn tab_and_newline_have_zero_visible_width() {
        let (page, _) = GlyphPage::bake(&Chunky, 40.0, 0, &GlyphConfig::default()).unwrap();
        assert_eq!(page.glyph('\t' as u32).rect.w, 0);
        assert_eq!(page.glyph('\n' as u32).rect.w, 0);
        assert!(page.glyph('a' as u32).rect.w > 0);
        assert_eq!(page.glyph('\t' as u32).advance, 32.0);
    }

    #[test]
    fn glyph_pixels_land_in_atlas() {
        let (page, _) =
            GlyphPage::bake(&MonospaceSource::new(8.0), 16.0, 0, &GlyphConfig::default())
                .unwrap();
        let g = page.glyph('A' as u32);
        assert_eq!(page.atlas().alpha(g.rect.x, g.rect.y), Some(0xFF));
        // Padding column left of the glyph stays empty.
        assert_eq!(page.atlas().alpha(g.rect.x - 1, g.rect.y), Some(0));
    }

    #[test]
    fn inconsistent_raster_is_rejected() {
        let err = GlyphPage::bake(&Broken, 16.0, 0, &GlyphConfig::default()).unwrap_err();
        assert_eq!(err, GlyphError::InvalidRaster { codepoint: 0 });
    }
}
