#![forbid(unsafe_code)]

//! A loaded font: glyph source, size, and its bucketed page cache.

use tracing::{debug, warn};

use crate::config::GlyphConfig;
use crate::error::GlyphError;
use crate::page::{BakedGlyph, GlyphPage, PAGE_SIZE};
use crate::registry::GlyphStats;
use crate::source::GlyphSource;

/// A font face at a fixed pixel size.
pub struct Font {
    source: Box<dyn GlyphSource>,
    px_size: f32,
    height: i32,
    tab_override: Option<i32>,
    /// `buckets[(cp >> 8) % len]` holds at most one baked page.
    buckets: Vec<Option<GlyphPage>>,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("px_size", &self.px_size)
            .field("height", &self.height)
            .field("tab_override", &self.tab_override)
            .field("resident_pages", &self.resident_pages())
            .finish()
    }
}

impl Font {
    pub(crate) fn new(source: Box<dyn GlyphSource>, px_size: f32, config: &GlyphConfig) -> Self {
        let height = source.vertical_metrics(px_size).line_height();
        let mut buckets = Vec::with_capacity(config.page_cache_size);
        buckets.resize_with(config.page_cache_size.max(1), || None);
        Self {
            source,
            px_size,
            height,
            tab_override: None,
            buckets,
        }
    }

    #[inline]
    pub fn px_size(&self) -> f32 {
        self.px_size
    }

    /// Line height in pixels.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of pages currently baked.
    pub fn resident_pages(&self) -> usize {
        self.buckets.iter().filter(|b| b.is_some()).count()
    }

    /// The baked page for `page`, if it is resident.
    pub fn page(&self, page: u32) -> Option<&GlyphPage> {
        self.buckets[self.bucket(page)]
            .as_ref()
            .filter(|p| p.index() == page)
    }

    #[inline]
    fn bucket(&self, page: u32) -> usize {
        page as usize % self.buckets.len()
    }

    /// Ensure the page holding `codepoint` is resident, baking it if needed.
    pub(crate) fn ensure_page(
        &mut self,
        codepoint: u32,
        config: &GlyphConfig,
        stats: &mut GlyphStats,
    ) -> Result<&GlyphPage, GlyphError> {
        let page = codepoint / PAGE_SIZE;
        let bucket = self.bucket(page);
        let resident = self.buckets[bucket].as_ref().map(GlyphPage::index);
        if resident != Some(page) {
            if let Some(evicted) = resident {
                stats.page_evictions += 1;
                debug!(evicted, page, bucket, "glyph page bucket aliased, evicting");
            }
            self.buckets[bucket] = None;
            let (baked, retries) =
                GlyphPage::bake(self.source.as_ref(), self.px_size, page, config)?;
            stats.pages_baked += 1;
            stats.bake_retries += retries as u64;
            self.buckets[bucket] = Some(baked);
        }
        self.buckets[bucket]
            .as_ref()
            .ok_or(GlyphError::AtlasOverflow { page, side: 0 })
    }

    /// Baked glyph for `codepoint`.
    pub(crate) fn glyph(
        &mut self,
        codepoint: u32,
        config: &GlyphConfig,
        stats: &mut GlyphStats,
    ) -> Result<BakedGlyph, GlyphError> {
        stats.lookups += 1;
        let mut glyph = self.ensure_page(codepoint, config, stats)?.glyph(codepoint);
        if codepoint == '\t' as u32
            && let Some(tab) = self.tab_override
        {
            glyph.advance = tab as f32;
        }
        Ok(glyph)
    }

    /// Sum of floored advances over `text`.
    ///
    /// Pages that fail to bake contribute zero width for their codepoints.
    pub(crate) fn text_width(
        &mut self,
        text: &str,
        config: &GlyphConfig,
        stats: &mut GlyphStats,
    ) -> i32 {
        let mut x = 0i32;
        for ch in text.chars() {
            match self.glyph(ch as u32, config, stats) {
                Ok(glyph) => x = x.saturating_add(glyph.advance_px()),
                Err(err) => warn!(%err, "glyph lookup failed, measuring as zero width"),
            }
        }
        x
    }

    /// Current tab advance: the override if set, otherwise the baked advance.
    pub(crate) fn tab_width(&mut self, config: &GlyphConfig, stats: &mut GlyphStats) -> i32 {
        match self.tab_override {
            Some(tab) => tab,
            None => self
                .glyph('\t' as u32, config, stats)
                .map(|g| g.advance_px())
                .unwrap_or(0),
        }
    }

    pub(crate) fn set_tab_width(&mut self, width: i32) {
        self.tab_override = Some(width);
    }
}
