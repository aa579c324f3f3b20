#![forbid(unsafe_code)]

//! Software RGBA canvas backend.
//!
//! Pixels persist across frames the way a real window surface does, so a
//! canvas driven through a [`RenderCache`](framecache_render::RenderCache)
//! shows exactly what partial repaints produce.

use framecache_core::{Color, FontId, Rect, Size, TextMetrics, TextRun};
use framecache_glyph::{FontRegistry, PAGE_SIZE};
use framecache_render::Backend;

/// Counters for work the canvas did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanvasStats {
    pub pixels_written: u64,
    pub presents: u64,
    pub presented_area: u64,
    pub fonts_released: u64,
}

/// In-memory framebuffer that rasterizes rects and glyphs with clipping and
/// source-over blending.
#[derive(Debug)]
pub struct Canvas {
    size: Size,
    pixels: Vec<Color>,
    clip: Rect,
    fonts: FontRegistry,
    stats: CanvasStats,
}

impl Canvas {
    /// Opaque black canvas.
    pub fn new(width: i32, height: i32, fonts: FontRegistry) -> Self {
        let size = Size::new(width.max(0), height.max(0));
        Self {
            size,
            pixels: vec![Color::BLACK; (size.width as usize) * (size.height as usize)],
            clip: size.to_rect(),
            fonts,
            stats: CanvasStats::default(),
        }
    }

    /// Resize the surface. Existing content is discarded.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.size = Size::new(width.max(0), height.max(0));
        self.pixels.clear();
        self.pixels.resize(
            (self.size.width as usize) * (self.size.height as usize),
            Color::BLACK,
        );
        self.clip = self.size.to_rect();
    }

    #[inline]
    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    #[inline]
    pub fn fonts_mut(&mut self) -> &mut FontRegistry {
        &mut self.fonts
    }

    #[inline]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.size.to_rect().contains_point(x, y) {
            return None;
        }
        self.pixels
            .get(y as usize * self.size.width as usize + x as usize)
            .copied()
    }

    #[inline]
    pub fn stats(&self) -> CanvasStats {
        self.stats
    }

    fn blend(&mut self, x: i32, y: i32, color: Color) {
        if !self.clip.contains_point(x, y) {
            return;
        }
        let idx = y as usize * self.size.width as usize + x as usize;
        if let Some(dst) = self.pixels.get_mut(idx) {
            *dst = color.over(*dst);
            self.stats.pixels_written += 1;
        }
    }
}

impl TextMetrics for Canvas {
    fn text_width(&mut self, font: FontId, text: &str) -> Option<i32> {
        self.fonts.text_width(font, text)
    }

    fn text_height(&self, font: FontId) -> Option<i32> {
        self.fonts.text_height(font)
    }

    fn tab_width(&mut self, font: FontId) -> Option<i32> {
        self.fonts.tab_width(font)
    }
}

impl Backend for Canvas {
    fn screen_size(&self) -> Size {
        self.size
    }

    fn set_clip(&mut self, rect: Rect) {
        self.clip = rect.intersection(&self.size.to_rect());
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        let area = rect.intersection(&self.clip);
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.blend(x, y, color);
            }
        }
    }

    fn draw_text(&mut self, run: &TextRun<'_>) -> i32 {
        let mut pen = run.x;
        for ch in run.text.chars() {
            let Ok(glyph) = self.fonts.glyph(run.font, ch) else {
                continue;
            };
            let advance = if ch == '\t' {
                run.tab_width
            } else {
                glyph.advance_px()
            };
            let page = ch as u32 / PAGE_SIZE;
            let mut coverage = Vec::with_capacity((glyph.rect.w * glyph.rect.h) as usize);
            if let Some(atlas) = self.fonts.page(run.font, page).map(|p| p.atlas()) {
                for gy in 0..glyph.rect.h {
                    for gx in 0..glyph.rect.w {
                        let a = atlas.alpha(glyph.rect.x + gx, glyph.rect.y + gy);
                        coverage.push(a.unwrap_or(0));
                    }
                }
            }
            let ox = pen + glyph.x_offset as i32;
            let oy = run.y + glyph.y_offset as i32;
            for (i, &a) in coverage.iter().enumerate() {
                if a == 0 {
                    continue;
                }
                let gx = (i as u32 % glyph.rect.w) as i32;
                let gy = (i as u32 / glyph.rect.w) as i32;
                let alpha = (a as u32 * run.color.a() as u32 / 255) as u8;
                self.blend(ox + gx, oy + gy, run.color.with_alpha(alpha));
            }
            pen += advance;
        }
        pen
    }

    fn present(&mut self, rects: &[Rect]) {
        self.stats.presents += 1;
        self.stats.presented_area += rects.iter().map(Rect::area).sum::<u64>();
    }

    fn release_font(&mut self, font: FontId) {
        if self.fonts.release(font) {
            self.stats.fonts_released += 1;
        }
    }
}
