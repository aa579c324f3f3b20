#![forbid(unsafe_code)]

//! Font arena.
//!
//! The `FontRegistry` owns every loaded [`Font`] and hands out generational
//! [`FontId`] handles. Releasing a font bumps its slot's generation, so any
//! handle still held elsewhere (for example inside a recorded command) turns
//! into a clean "missing font" instead of aliasing a newer font.
//!
//! # Usage
//!
//! ```
//! use framecache_core::TextMetrics;
//! use framecache_glyph::{FontRegistry, MonospaceSource};
//!
//! let mut fonts = FontRegistry::new();
//! let id = fonts.load(MonospaceSource::new(7.0), 14.0);
//! assert_eq!(fonts.text_height(id), Some(14));
//! assert!(fonts.release(id));
//! assert_eq!(fonts.text_width(id, "gone"), None);
//! ```

use framecache_core::{FontId, TextMetrics};
use tracing::{debug, warn};

use crate::config::GlyphConfig;
use crate::error::GlyphError;
use crate::font::Font;
use crate::page::{BakedGlyph, GlyphPage};
use crate::source::GlyphSource;

/// Glyph cache counters, summed over every font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphStats {
    pub lookups: u64,
    pub pages_baked: u64,
    /// Atlas overflows that forced a larger bitmap.
    pub bake_retries: u64,
    /// Pages dropped because another page needed the same bucket.
    pub page_evictions: u64,
    pub fonts_loaded: u64,
    pub fonts_released: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    font: Option<Font>,
}

/// Generational arena of fonts.
#[derive(Debug)]
pub struct FontRegistry {
    config: GlyphConfig,
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    stats: GlyphStats,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    /// Create a registry with the default page cache configuration.
    pub fn new() -> Self {
        Self {
            config: GlyphConfig::default(),
            slots: Vec::new(),
            free_list: Vec::new(),
            stats: GlyphStats::default(),
        }
    }

    /// Create a registry with an explicit configuration.
    pub fn with_config(config: GlyphConfig) -> Result<Self, GlyphError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    #[inline]
    pub fn config(&self) -> &GlyphConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> GlyphStats {
        self.stats
    }

    /// Number of live fonts.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.font.is_some()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load a font face at `px_size` and return its handle.
    ///
    /// Page 0 is baked eagerly so tab and newline metrics exist from the start.
    pub fn load(&mut self, source: impl GlyphSource + 'static, px_size: f32) -> FontId {
        let mut font = Font::new(Box::new(source), px_size, &self.config);
        if let Err(err) = font.ensure_page('\n' as u32, &self.config, &mut self.stats) {
            warn!(%err, "failed to bake initial glyph page");
        }

        let index = match self.free_list.pop() {
            Some(index) => {
                self.slots[index as usize].font = Some(font);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    font: Some(font),
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.stats.fonts_loaded += 1;
        let id = FontId::new(index, self.slots[index as usize].generation);
        debug!(index, generation = id.generation(), px_size, "font loaded");
        id
    }

    /// Release a font and all its pages.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn release(&mut self, id: FontId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index() as usize) else {
            return false;
        };
        if slot.generation != id.generation() || slot.font.is_none() {
            return false;
        }
        slot.font = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index());
        self.stats.fonts_released += 1;
        debug!(index = id.index(), "font released");
        true
    }

    /// Check whether a handle refers to a live font.
    #[inline]
    pub fn contains(&self, id: FontId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: FontId) -> Option<&Font> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.font.as_ref())
    }

    fn get_mut(&mut self, id: FontId) -> Result<&mut Font, GlyphError> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.font.as_mut())
            .ok_or(GlyphError::MissingFont(id))
    }

    /// Override the tab advance of a font.
    pub fn set_tab_width(&mut self, id: FontId, width: i32) -> Result<(), GlyphError> {
        self.get_mut(id)?.set_tab_width(width);
        Ok(())
    }

    /// Baked glyph for `ch`, baking its page on demand.
    pub fn glyph(&mut self, id: FontId, ch: char) -> Result<BakedGlyph, GlyphError> {
        let config = self.config;
        let mut stats = self.stats;
        let result = self.get_mut(id)?.glyph(ch as u32, &config, &mut stats);
        self.stats = stats;
        result
    }

    /// Resident page `page` of a font, if baked.
    pub fn page(&self, id: FontId, page: u32) -> Option<&GlyphPage> {
        self.get(id)?.page(page)
    }
}

impl TextMetrics for FontRegistry {
    fn text_width(&mut self, font: FontId, text: &str) -> Option<i32> {
        let config = self.config;
        let mut stats = self.stats;
        let width = self.get_mut(font).ok()?.text_width(text, &config, &mut stats);
        self.stats = stats;
        Some(width)
    }

    fn text_height(&self, font: FontId) -> Option<i32> {
        self.get(font).map(Font::height)
    }

    fn tab_width(&mut self, font: FontId) -> Option<i32> {
        let config = self.config;
        let mut stats = self.stats;
        let tab = self.get_mut(font).ok()?.tab_width(&config, &mut stats);
        self.stats = stats;
        Some(tab)
    }
}
