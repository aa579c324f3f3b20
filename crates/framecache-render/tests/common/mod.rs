#![allow(dead_code)]

use framecache_core::{Color, FontId, Rect, Size, TextMetrics, TextRun};
use framecache_glyph::{FontRegistry, MonospaceSource};
use framecache_render::Backend;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Clip(Rect),
    Rect(Rect, Color),
    Text { font: FontId, text: String, x: i32, y: i32 },
    Present(Vec<Rect>),
    Release(FontId),
}

/// Backend that logs every call and measures text with a real registry.
pub struct Recorder {
    pub size: Size,
    pub fonts: FontRegistry,
    pub events: Vec<Event>,
}

impl Recorder {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            size: Size::new(width, height),
            fonts: FontRegistry::new(),
            events: Vec::new(),
        }
    }

    /// Load an 8px-advance, 16px-high monospace font.
    pub fn load_font(&mut self) -> FontId {
        self.fonts.load(MonospaceSource::new(8.0), 16.0)
    }

    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl TextMetrics for Recorder {
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

impl Backend for Recorder {
    fn screen_size(&self) -> Size {
        self.size
    }

    fn set_clip(&mut self, rect: Rect) {
        self.events.push(Event::Clip(rect));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.events.push(Event::Rect(rect, color));
    }

    fn draw_text(&mut self, run: &TextRun<'_>) -> i32 {
        // Drawing with a released font is a use-after-free in a real backend.
        assert!(
            self.fonts.contains(run.font),
            "draw_text with released font {:?}",
            run.font
        );
        self.events.push(Event::Text {
            font: run.font,
            text: run.text.to_owned(),
            x: run.x,
            y: run.y,
        });
        run.x + self.fonts.text_width(run.font, run.text).unwrap_or(0)
    }

    fn present(&mut self, rects: &[Rect]) {
        self.events.push(Event::Present(rects.to_vec()));
    }

    fn release_font(&mut self, font: FontId) {
        self.fonts.release(font);
        self.events.push(Event::Release(font));
    }
}

/// Whether the union of `rects` covers every pixel of `target`.
pub fn covers(rects: &[Rect], target: Rect) -> bool {
    if target.is_empty() {
        return true;
    }
    (target.y..target.bottom())
        .all(|y| (target.x..target.right()).all(|x| rects.iter().any(|r| r.contains_point(x, y))))
}
