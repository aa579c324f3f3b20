#![forbid(unsafe_code)]

//! A backend that records calls instead of drawing.

use framecache_core::{Color, FontId, Rect, Size, TextMetrics, TextRun};
use framecache_glyph::FontRegistry;
use framecache_render::Backend;

/// One backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    SetClip(Rect),
    DrawRect(Rect, Color),
    DrawText {
        font: FontId,
        text: String,
        x: i32,
        y: i32,
        color: Color,
    },
    Present(Vec<Rect>),
    ReleaseFont(FontId),
}

/// Logs every call in order. Text is measured with a real [`FontRegistry`],
/// and drawing with a font that was already released panics, which turns a
/// deferred-free ordering bug into a test failure.
#[derive(Debug)]
pub struct RecordingBackend {
    size: Size,
    fonts: FontRegistry,
    events: Vec<BackendEvent>,
}

impl RecordingBackend {
    pub fn new(width: i32, height: i32, fonts: FontRegistry) -> Self {
        Self {
            size: Size::new(width, height),
            fonts,
            events: Vec::new(),
        }
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.size = Size::new(width, height);
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
    pub fn events(&self) -> &[BackendEvent] {
        &self.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<BackendEvent> {
        std::mem::take(&mut self.events)
    }
}

impl TextMetrics for RecordingBackend {
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

impl Backend for RecordingBackend {
    fn screen_size(&self) -> Size {
        self.size
    }

    fn set_clip(&mut self, rect: Rect) {
        self.events.push(BackendEvent::SetClip(rect));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.events.push(BackendEvent::DrawRect(rect, color));
    }

    fn draw_text(&mut self, run: &TextRun<'_>) -> i32 {
        assert!(
            self.fonts.contains(run.font),
            "draw_text after release of {:?}",
            run.font
        );
        self.events.push(BackendEvent::DrawText {
            font: run.font,
            text: run.text.to_owned(),
            x: run.x,
            y: run.y,
            color: run.color,
        });
        run.x + self.fonts.text_width(run.font, run.text).unwrap_or(0)
    }

    fn present(&mut self, rects: &[Rect]) {
        self.events.push(BackendEvent::Present(rects.to_vec()));
    }

    fn release_font(&mut self, font: FontId) {
        self.fonts.release(font);
        self.events.push(BackendEvent::ReleaseFont(font));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecache_glyph::MonospaceSource;
    use framecache_render::RenderCache;

    #[test]
    fn frame_logs_replay_present_release_in_order() {
        let mut fonts = FontRegistry::new();
        let font = fonts.load(MonospaceSource::new(8.0), 16.0);
        let mut cache = RenderCache::new(RecordingBackend::new(200, 100, fonts));

        cache.begin_frame();
        cache.record_draw_text(font, "hi", 4, 4, Color::WHITE);
        cache.record_release_font(font);
        cache.end_frame();

        let events = cache.backend_mut().take_events();
        assert_eq!(events.first(), Some(&BackendEvent::SetClip(Rect::from_size(200, 100))));
        assert!(matches!(events[1], BackendEvent::DrawText { x: 4, y: 4, .. }));
        assert_eq!(
            events[2],
            BackendEvent::Present(vec![Rect::from_size(200, 100)])
        );
        assert_eq!(events[3], BackendEvent::ReleaseFont(font));
        assert_eq!(events.len(), 4);
    }
}
