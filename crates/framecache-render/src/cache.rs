#![forbid(unsafe_code)]

//! The host-facing frame cache.

use framecache_core::{Color, FontId, Rect, Size};
use tracing::{debug, debug_span, trace, warn};

use crate::backend::Backend;
use crate::cell_grid::{CellGrid, CellGridPair};
use crate::command::Command;
use crate::command_buffer::CommandBuffer;
use crate::compositor::Compositor;
use crate::config::CacheConfig;
use crate::dirty::DirtyRegionBuilder;
use crate::error::{ConfigError, RecordError};

/// What the last [`RenderCache::end_frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Zero-based index of the frame.
    pub frame: u64,
    /// Commands recorded.
    pub commands: usize,
    /// Commands dropped because the buffer was full.
    pub dropped: usize,
    /// Cells whose hash changed (or every cell on a full repaint).
    pub dirty_cells: usize,
    /// Dirty rectangles replayed and presented.
    pub dirty_rects: usize,
    /// Sum of dirty rectangle areas in pixels. Rectangles never overlap
    /// after merging, but may over-cover changed content.
    pub dirty_area: u64,
    pub fonts_released: usize,
    /// The frame followed a resize or [`RenderCache::invalidate_all`].
    pub full_repaint: bool,
}

/// Frame-damage cache in front of a [`Backend`].
///
/// Each frame: [`begin_frame`](Self::begin_frame), any number of `record_*`
/// calls, then [`end_frame`](Self::end_frame), which repaints only the screen
/// regions whose recorded content changed since the previous frame.
///
/// ```
/// # use framecache_core::{Color, FontId, Rect, Size, TextMetrics, TextRun};
/// # use framecache_render::{Backend, RenderCache};
/// # struct Null;
/// # impl TextMetrics for Null {
/// #     fn text_width(&mut self, _: FontId, t: &str) -> Option<i32> { Some(t.len() as i32) }
/// #     fn text_height(&self, _: FontId) -> Option<i32> { Some(1) }
/// #     fn tab_width(&mut self, _: FontId) -> Option<i32> { Some(4) }
/// # }
/// # impl Backend for Null {
/// #     fn screen_size(&self) -> Size { Size::new(640, 480) }
/// #     fn set_clip(&mut self, _: Rect) {}
/// #     fn draw_rect(&mut self, _: Rect, _: Color) {}
/// #     fn draw_text(&mut self, run: &TextRun<'_>) -> i32 { run.x }
/// #     fn present(&mut self, _: &[Rect]) {}
/// #     fn release_font(&mut self, _: FontId) {}
/// # }
/// let mut cache = RenderCache::new(Null);
///
/// cache.begin_frame();
/// cache.record_draw_rect(Rect::new(10, 10, 50, 50), Color::RED);
/// cache.end_frame();
/// assert!(cache.last_frame_stats().full_repaint);
///
/// cache.begin_frame();
/// cache.record_draw_rect(Rect::new(10, 10, 50, 50), Color::RED);
/// cache.end_frame();
/// assert!(cache.last_dirty_rects().is_empty());
/// ```
#[derive(Debug)]
pub struct RenderCache<B: Backend> {
    backend: B,
    config: CacheConfig,
    /// `None` until the first `begin_frame`, which forces a full repaint.
    screen: Option<Size>,
    buffer: CommandBuffer,
    grids: CellGridPair,
    dirty: DirtyRegionBuilder,
    dirty_rects: Vec<Rect>,
    compositor: Compositor,
    /// Fonts whose `FreeFont` record did not fit in the buffer.
    overflow_frees: Vec<FontId>,
    stats: FrameStats,
    frame: u64,
}

impl<B: Backend> RenderCache<B> {
    /// Cache with [`CacheConfig::default`].
    pub fn new(backend: B) -> Self {
        Self::build(backend, CacheConfig::default())
    }

    /// Cache with a validated custom configuration.
    pub fn with_config(backend: B, config: CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(backend, config))
    }

    fn build(backend: B, config: CacheConfig) -> Self {
        Self {
            backend,
            screen: None,
            buffer: CommandBuffer::with_capacity(config.command_buffer_bytes),
            grids: CellGridPair::new(config.cell_size),
            dirty: DirtyRegionBuilder::default(),
            dirty_rects: Vec::new(),
            compositor: Compositor::new(config.debug_overlay, config.overlay_seed),
            overflow_frees: Vec::new(),
            stats: FrameStats::default(),
            frame: 0,
            config,
        }
    }

    /// Start a frame. Picks up screen size changes and, on any change
    /// (including the very first call), schedules a full repaint.
    pub fn begin_frame(&mut self) {
        let size = self.backend.screen_size();
        if self.screen != Some(size) {
            debug!(
                width = size.width,
                height = size.height,
                "screen size changed, invalidating"
            );
            self.screen = Some(size);
            self.grids.reshape(size);
        }
    }

    /// Toggle translucent tinting of repainted regions.
    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.config.debug_overlay = enabled;
        self.compositor.set_debug_overlay(enabled);
    }

    /// Force every cell to repaint on the next `end_frame`.
    pub fn invalidate_all(&mut self) {
        debug!("full invalidation requested");
        self.grids.invalidate();
    }

    #[inline]
    fn screen_rect(&self) -> Rect {
        self.screen.unwrap_or_default().to_rect()
    }

    /// Replace the clip region for subsequent commands. The rectangle is
    /// clipped to the screen before it is stored.
    pub fn record_set_clip(&mut self, rect: Rect) {
        let _ = self.try_record_set_clip(rect);
    }

    pub fn try_record_set_clip(&mut self, rect: Rect) -> Result<(), RecordError> {
        let rect = rect.intersection(&self.screen_rect());
        self.buffer.push(&Command::SetClip { rect })
    }

    /// Fill a rectangle. Rectangles entirely off-screen are not recorded.
    pub fn record_draw_rect(&mut self, rect: Rect, color: Color) {
        let _ = self.try_record_draw_rect(rect, color);
    }

    pub fn try_record_draw_rect(&mut self, rect: Rect, color: Color) -> Result<(), RecordError> {
        if rect.intersection_opt(&self.screen_rect()).is_none() {
            return Ok(());
        }
        self.buffer.push(&Command::DrawRect { rect, color })
    }

    /// Draw `text` with its pen at (`x`, `y`) and return the pen x after it.
    ///
    /// The advance is measured even when the text is off-screen or the buffer
    /// is full, so layout stays correct. A missing font records nothing and
    /// returns `x`.
    pub fn record_draw_text(
        &mut self,
        font: FontId,
        text: &str,
        x: i32,
        y: i32,
        color: Color,
    ) -> i32 {
        match self.measure_and_push(font, text, x, y, color) {
            Ok(end) => end,
            Err((end, RecordError::MissingFont(font))) => {
                warn!(
                    index = font.index(),
                    generation = font.generation(),
                    "draw_text with missing font"
                );
                end
            }
            Err((end, RecordError::BufferExhausted { .. })) => end,
        }
    }

    /// Like [`record_draw_text`](Self::record_draw_text) but reports why
    /// nothing was recorded.
    pub fn try_record_draw_text(
        &mut self,
        font: FontId,
        text: &str,
        x: i32,
        y: i32,
        color: Color,
    ) -> Result<i32, RecordError> {
        self.measure_and_push(font, text, x, y, color)
            .map_err(|(_, err)| err)
    }

    fn measure_and_push(
        &mut self,
        font: FontId,
        text: &str,
        x: i32,
        y: i32,
        color: Color,
    ) -> Result<i32, (i32, RecordError)> {
        let missing = (x, RecordError::MissingFont(font));
        let width = self.backend.text_width(font, text).ok_or(missing)?;
        let height = self.backend.text_height(font).ok_or(missing)?;
        let tab_width = self.backend.tab_width(font).ok_or(missing)?;
        let end = x.saturating_add(width);
        let rect = Rect::new(x, y, width, height);
        if rect.intersection_opt(&self.screen_rect()).is_none() {
            return Ok(end);
        }
        self.buffer
            .push(&Command::DrawText {
                rect,
                color,
                font,
                tab_width,
                text,
            })
            .map(|()| end)
            .map_err(|err| (end, err))
    }

    /// Ask for `font` to be released once this frame has been presented.
    ///
    /// Never dropped: if the buffer is full the request is kept on the side.
    pub fn record_release_font(&mut self, font: FontId) {
        if self.buffer.push(&Command::FreeFont { font }).is_err() {
            self.overflow_frees.push(font);
        }
    }

    /// Hash, diff, merge, replay, present and release fonts for the frame,
    /// then reset for the next one.
    pub fn end_frame(&mut self) {
        if self.screen.is_none() {
            self.begin_frame();
        }
        let _span = debug_span!("end_frame", frame = self.frame).entered();
        let screen = self.screen_rect();
        let full_repaint = self.grids.is_invalidated();

        self.grids.accumulate(&self.buffer, screen);
        self.dirty.reset(self.grids.dirty_limit());
        let dirty_cells = self.grids.diff_and_swap(&mut self.dirty);
        {
            let _merge = debug_span!("merge", seeds = dirty_cells).entered();
            self.dirty
                .to_pixels(self.config.cell_size, screen, &mut self.dirty_rects);
        }

        let fonts_released = self.compositor.compose(
            &mut self.backend,
            &self.buffer,
            &self.dirty_rects,
            &self.overflow_frees,
        );

        self.stats = FrameStats {
            frame: self.frame,
            commands: self.buffer.command_count(),
            dropped: self.buffer.dropped(),
            dirty_cells,
            dirty_rects: self.dirty_rects.len(),
            dirty_area: self.dirty_rects.iter().map(Rect::area).sum(),
            fonts_released,
            full_repaint,
        };
        trace!(
            commands = self.stats.commands,
            dropped = self.stats.dropped,
            dirty_cells,
            dirty_rects = self.stats.dirty_rects,
            dirty_area = self.stats.dirty_area,
            "frame complete"
        );
        if self.stats.dropped > 0 {
            warn!(
                dropped = self.stats.dropped,
                capacity = self.buffer.capacity(),
                "frame dropped commands"
            );
        }

        self.buffer.reset();
        self.overflow_frees.clear();
        self.frame += 1;
    }

    /// Pixel rectangles repainted by the last `end_frame`.
    #[inline]
    pub fn last_dirty_rects(&self) -> &[Rect] {
        &self.dirty_rects
    }

    #[inline]
    pub fn last_frame_stats(&self) -> FrameStats {
        self.stats
    }

    /// Cell hashes of the last completed frame.
    #[inline]
    pub fn last_frame_hashes(&self) -> &CellGrid {
        self.grids.previous()
    }

    /// Commands recorded so far this frame.
    #[inline]
    pub fn command_buffer(&self) -> &CommandBuffer {
        &self.buffer
    }

    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Screen size seen by the last `begin_frame`.
    #[inline]
    pub fn screen_size(&self) -> Option<Size> {
        self.screen
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
