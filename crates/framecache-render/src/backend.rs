#![forbid(unsafe_code)]

//! The rasterization seam.

use framecache_core::{Color, FontId, Rect, Size, TextMetrics, TextRun};

/// Whatever actually puts pixels on screen.
///
/// The cache never rasterizes. It measures text through the
/// [`TextMetrics`] supertrait at record time and, at the end of a frame,
/// replays recorded commands through the drawing methods here.
pub trait Backend: TextMetrics {
    /// Current drawable size in pixels.
    fn screen_size(&self) -> Size;

    /// Restrict subsequent drawing to `rect`.
    fn set_clip(&mut self, rect: Rect);

    /// Fill `rect` with `color`, honoring the current clip.
    fn draw_rect(&mut self, rect: Rect, color: Color);

    /// Draw a run of text, honoring the current clip. Returns the pen x after
    /// the last glyph.
    fn draw_text(&mut self, run: &TextRun<'_>) -> i32;

    /// Flush exactly these screen regions.
    fn present(&mut self, rects: &[Rect]);

    /// Destroy a font. Called only after the frame that freed it has been
    /// fully replayed and presented.
    fn release_font(&mut self, font: FontId);
}
