#![forbid(unsafe_code)]

//! Glyph bounding provider: code-page atlases and text metrics.
//!
//! Glyphs are grouped into pages of 256 codepoints. A page's atlas is baked
//! the first time any of its codepoints is measured, and each font retains a
//! fixed number of pages selected by `(codepoint >> 8) % page_cache_size`.
//! Two pages that land in the same bucket evict one another; the evicted page
//! is simply rebaked on the next lookup.
//!
//! # Usage
//!
//! ```
//! use framecache_core::TextMetrics;
//! use framecache_glyph::{FontRegistry, MonospaceSource};
//!
//! let mut fonts = FontRegistry::new();
//! let font = fonts.load(MonospaceSource::new(8.0), 16.0);
//! assert_eq!(fonts.text_width(font, "abc"), Some(24));
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod page;
pub mod registry;
pub mod source;

pub use config::GlyphConfig;
pub use error::GlyphError;
pub use font::Font;
pub use page::{AtlasBitmap, AtlasRect, BakedGlyph, GlyphPage, PAGE_SIZE};
pub use registry::{FontRegistry, GlyphStats};
pub use source::{GlyphRaster, GlyphSource, MonospaceSource, VerticalMetrics};
