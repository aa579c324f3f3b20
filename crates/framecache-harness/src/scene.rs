#![forbid(unsafe_code)]

//! A scripted, editor-like scene for driving the cache headlessly.
//!
//! The scene is deterministic: frame `n` always draws the same commands, so
//! runs are reproducible and dirty-region counts can be compared across
//! builds.

use framecache_core::{Color, FontId, Rect, Size, TextMetrics};
use framecache_render::{Backend, RenderCache};

const BACKGROUND: Color = Color::rgb(24, 24, 28);
const GUTTER: Color = Color::rgb(32, 32, 38);
const STATUS: Color = Color::rgb(48, 52, 70);
const TEXT: Color = Color::rgb(220, 220, 210);
const LINE_NUMBER: Color = Color::rgb(110, 110, 120);
const CARET: Color = Color::rgb(250, 200, 80);

const SOURCE: &[&str] = &[
    "use framecache::prelude::*;",
    "",
    "fn main() {",
    "\tlet mut cache = RenderCache::new(backend);",
    "\tloop {",
    "\t\tcache.begin_frame();",
    "\t\tdraw(&mut cache);",
    "\t\tcache.end_frame();",
    "\t}",
    "}",
];

/// Frames between caret blinks.
const BLINK_PERIOD: u64 = 15;
/// Frames between typed characters.
const TYPE_PERIOD: u64 = 4;

/// Editor scene state.
#[derive(Debug, Clone)]
pub struct EditorScene {
    font: FontId,
    lines: Vec<String>,
    frame: u64,
    gutter_width: i32,
}

impl EditorScene {
    pub fn new(font: FontId) -> Self {
        Self {
            font,
            lines: SOURCE.iter().map(|s| (*s).to_owned()).collect(),
            frame: 0,
            gutter_width: 48,
        }
    }

    /// Frames drawn so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Record one frame's worth of commands and advance the script.
    ///
    /// Every few frames a character is typed on the last line; the caret
    /// blinks; the status bar shows the frame's line count.
    pub fn draw<B: Backend>(&mut self, cache: &mut RenderCache<B>) {
        let screen = cache.screen_size().unwrap_or_default();
        let line_height = cache
            .backend()
            .text_height(self.font)
            .unwrap_or(16)
            .max(1);

        if self.frame > 0 && self.frame % TYPE_PERIOD == 0 {
            let ch = (b'a' + (self.frame / TYPE_PERIOD % 26) as u8) as char;
            if let Some(last) = self.lines.last_mut() {
                last.push(ch);
                if last.len() > 60 {
                    self.lines.push(String::new());
                }
            }
        }

        cache.record_draw_rect(screen.to_rect(), BACKGROUND);
        cache.record_draw_rect(Rect::new(0, 0, self.gutter_width, screen.height), GUTTER);

        let body = Rect::new(
            self.gutter_width,
            0,
            screen.width - self.gutter_width,
            screen.height - line_height,
        );
        let visible = (body.height / line_height).max(0) as usize;
        let first = self.lines.len().saturating_sub(visible);

        let mut caret_x = body.x + 4;
        let mut caret_y = 0;
        for (row, line) in self.lines[first..].iter().enumerate() {
            let y = row as i32 * line_height;
            cache.record_set_clip(Rect::new(0, y, self.gutter_width, line_height));
            cache.record_draw_text(
                self.font,
                &format!("{:>3}", first + row + 1),
                4,
                y,
                LINE_NUMBER,
            );
            cache.record_set_clip(body);
            caret_x = cache.record_draw_text(self.font, line, body.x + 4, y, TEXT);
            caret_y = y;
        }

        cache.record_set_clip(screen.to_rect());
        if (self.frame / BLINK_PERIOD) % 2 == 0 {
            cache.record_draw_rect(Rect::new(caret_x, caret_y, 2, line_height), CARET);
        }
        self.draw_status(cache, screen, line_height);
        self.frame += 1;
    }

    fn draw_status<B: Backend>(&self, cache: &mut RenderCache<B>, screen: Size, line_height: i32) {
        let bar = Rect::new(0, screen.height - line_height, screen.width, line_height);
        cache.record_draw_rect(bar, STATUS);
        let status = format!("{} lines  {}x{}", self.lines.len(), screen.width, screen.height);
        cache.record_draw_text(self.font, &status, 8, bar.y, TEXT);
    }
}
