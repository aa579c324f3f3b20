#![forbid(unsafe_code)]

//! Replay of recorded commands into dirty rectangles.
//!
//! The whole buffer is replayed once per dirty rectangle with the backend
//! clipped to that rectangle; drawing commands are issued unconditionally and
//! the backend clip limits pixel writes. After every pass the frame is
//! presented, and only then are fonts freed during the frame released.

use framecache_core::{Color, FontId, Rect, TextRun};
use tracing::{debug_span, trace};

use crate::backend::Backend;
use crate::command::Command;
use crate::command_buffer::CommandBuffer;

/// Alpha of debug overlay tints.
pub const OVERLAY_ALPHA: u8 = 50;

/// Drives replay, present and deferred font release.
#[derive(Debug, Clone)]
pub struct Compositor {
    debug_overlay: bool,
    rng: u64,
}

impl Compositor {
    pub fn new(debug_overlay: bool, seed: u64) -> Self {
        Self {
            debug_overlay,
            // xorshift gets stuck at zero.
            rng: if seed == 0 { 1 } else { seed },
        }
    }

    #[inline]
    pub fn debug_overlay(&self) -> bool {
        self.debug_overlay
    }

    #[inline]
    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.debug_overlay = enabled;
    }

    /// Next overlay tint.
    fn overlay_color(&mut self) -> Color {
        let mut s = self.rng;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.rng = s;
        let [r, g, b, ..] = s.to_le_bytes();
        Color::rgba(r, g, b, OVERLAY_ALPHA)
    }

    /// Replay `buffer` into each of `dirty`, present, then release fonts.
    ///
    /// `extra_frees` holds fonts whose `FreeFont` record did not fit in the
    /// buffer; they are released together with the recorded ones. Returns
    /// the number of fonts released.
    pub fn compose<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        buffer: &CommandBuffer,
        dirty: &[Rect],
        extra_frees: &[FontId],
    ) -> usize {
        for &region in dirty {
            self.replay(backend, buffer, region);
        }

        if !dirty.is_empty() {
            backend.present(dirty);
        }

        let mut released = 0;
        if buffer.has_free_requests() {
            for record in buffer {
                if let Command::FreeFont { font } = record.command {
                    backend.release_font(font);
                    released += 1;
                }
            }
        }
        for &font in extra_frees {
            backend.release_font(font);
            released += 1;
        }
        if released > 0 {
            trace!(released, "released fonts after present");
        }
        released
    }

    fn replay<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        buffer: &CommandBuffer,
        region: Rect,
    ) {
        let _span = debug_span!(
            "replay",
            x = region.x,
            y = region.y,
            w = region.width,
            h = region.height
        )
        .entered();
        backend.set_clip(region);
        for record in buffer {
            match record.command {
                Command::SetClip { rect } => backend.set_clip(rect.intersection(&region)),
                Command::DrawRect { rect, color } => backend.draw_rect(rect, color),
                Command::DrawText {
                    rect,
                    color,
                    font,
                    tab_width,
                    text,
                } => {
                    backend.draw_text(&TextRun {
                        font,
                        text,
                        x: rect.x,
                        y: rect.y,
                        color,
                        tab_width,
                    });
                }
                Command::FreeFont { .. } => {}
            }
        }
        if self.debug_overlay {
            let tint = self.overlay_color();
            backend.set_clip(region);
            backend.draw_rect(region, tint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecache_core::{Size, TextMetrics};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clip(Rect),
        Rect(Rect, Color),
        Text(String, i32, i32),
        Present(usize),
        Release(FontId),
    }

    #[derive(Default)]
    struct Log(Vec<Call>);

    impl TextMetrics for Log {
        fn text_width(&mut self, _: FontId, text: &str) -> Option<i32> {
            Some(text.len() as i32 * 8)
        }
        fn text_height(&self, _: FontId) -> Option<i32> {
            Some(16)
        }
        fn tab_width(&mut self, _: FontId) -> Option<i32> {
            Some(32)
        }
    }

    impl Backend for Log {
        fn screen_size(&self) -> Size {
            Size::new(400, 300)
        }
        fn set_clip(&mut self, rect: Rect) {
            self.0.push(Call::Clip(rect));
        }
        fn draw_rect(&mut self, rect: Rect, color: Color) {
            self.0.push(Call::Rect(rect, color));
        }
        fn draw_text(&mut self, run: &TextRun<'_>) -> i32 {
            self.0.push(Call::Text(run.text.to_owned(), run.x, run.y));
            run.x + run.text.len() as i32 * 8
        }
        fn present(&mut self, rects: &[Rect]) {
            self.0.push(Call::Present(rects.len()));
        }
        fn release_font(&mut self, font: FontId) {
            self.0.push(Call::Release(font));
        }
    }

    const FONT: FontId = FontId::new(2, 0);

    fn buffer() -> CommandBuffer {
        let mut buf = CommandBuffer::with_capacity(1024);
        buf.push(&Command::DrawText {
            rect: Rect::new(5, 6, 24, 16),
            color: Color::WHITE,
            font: FONT,
            tab_width: 32,
            text: "abc",
        })
        .unwrap();
        buf.push(&Command::FreeFont { font: FONT }).unwrap();
        buf.push(&Command::SetClip {
            rect: Rect::new(0, 0, 50, 50),
        })
        .unwrap();
        buf.push(&Command::DrawRect {
            rect: Rect::new(0, 0, 10, 10),
            color: Color::RED,
        })
        .unwrap();
        buf
    }

    #[test]
    fn replays_every_pass_then_presents_then_releases() {
        let mut log = Log::default();
        let dirty = [Rect::new(0, 0, 20, 20), Rect::new(30, 30, 40, 40)];
        let released = Compositor::new(false, 1).compose(&mut log, &buffer(), &dirty, &[]);
        assert_eq!(released, 1);

        let calls = &log.0;
        let texts = calls.iter().filter(|c| matches!(c, Call::Text(..))).count();
        assert_eq!(texts, 2);
        let present = calls.iter().position(|c| *c == Call::Present(2)).unwrap();
        let release = calls.iter().position(|c| *c == Call::Release(FONT)).unwrap();
        let last_text = calls.iter().rposition(|c| matches!(c, Call::Text(..))).unwrap();
        assert!(last_text < present);
        assert!(present < release);
    }

    #[test]
    fn set_clip_is_intersected_with_region() {
        let mut log = Log::default();
        let region = Rect::new(30, 30, 40, 40);
        Compositor::new(false, 1).compose(&mut log, &buffer(), &[region], &[]);
        assert_eq!(log.0[0], Call::Clip(region));
        assert!(log.0.contains(&Call::Clip(Rect::new(30, 30, 20, 20))));
    }

    #[test]
    fn fonts_released_without_dirty_regions() {
        let mut log = Log::default();
        let extra = FontId::new(9, 1);
        let released = Compositor::new(false, 1).compose(&mut log, &buffer(), &[], &[extra]);
        assert_eq!(released, 2);
        assert_eq!(log.0, vec![Call::Release(FONT), Call::Release(extra)]);
    }

    #[test]
    fn overlay_tints_each_region_translucently() {
        let mut log = Log::default();
        let region = Rect::new(0, 0, 20, 20);
        let mut compositor = Compositor::new(true, 42);
        compositor.compose(&mut log, &CommandBuffer::with_capacity(64), &[region], &[]);
        match &log.0[..] {
            [Call::Clip(a), Call::Clip(b), Call::Rect(r, c), Call::Present(1)] => {
                assert_eq!((*a, *b, *r), (region, region, region));
                assert_eq!(c.a(), OVERLAY_ALPHA);
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[test]
    fn overlay_colors_are_seeded() {
        let mut a = Compositor::new(true, 7);
        let mut b = Compositor::new(true, 7);
        let ca: Vec<_> = (0..4).map(|_| a.overlay_color()).collect();
        let cb: Vec<_> = (0..4).map(|_| b.overlay_color()).collect();
        assert_eq!(ca, cb);
        assert_ne!(ca[0], ca[1]);
    }
}
