#![forbid(unsafe_code)]

//! Frame-damage cache public facade.
//!
//! Re-exports the types a host needs to put a [`RenderCache`] in front of its
//! rasterizer, plus a prelude.
//!
//! ```ignore
//! use framecache::prelude::*;
//!
//! let mut cache = RenderCache::new(my_backend);
//! loop {
//!     cache.begin_frame();
//!     cache.record_draw_rect(Rect::new(0, 0, 640, 480), Color::BLACK);
//!     cache.end_frame();
//! }
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use framecache_core::{Color, FontId, Rect, Size, TextMetrics, TextRun};

// --- Render re-exports -----------------------------------------------------

pub use framecache_render::{
    Backend, CacheConfig, ConfigError, FrameStats, RecordError, RenderCache,
};

// --- Glyph re-exports ------------------------------------------------------

#[cfg(feature = "glyph")]
pub use framecache_glyph::{
    FontRegistry, GlyphConfig, GlyphError, GlyphSource, GlyphStats, MonospaceSource,
};

// --- Errors ---------------------------------------------------------------

/// Any error surfaced by the framecache crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Config(ConfigError),
    Record(RecordError),
    #[cfg(feature = "glyph")]
    Glyph(GlyphError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Record(err) => write!(f, "{err}"),
            #[cfg(feature = "glyph")]
            Self::Glyph(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Record(err) => Some(err),
            #[cfg(feature = "glyph")]
            Self::Glyph(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<RecordError> for Error {
    fn from(err: RecordError) -> Self {
        Self::Record(err)
    }
}

#[cfg(feature = "glyph")]
impl From<GlyphError> for Error {
    fn from(err: GlyphError) -> Self {
        Self::Glyph(err)
    }
}

/// Standard result type for framecache APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Backend, CacheConfig, Color, Error, FontId, FrameStats, Rect, RenderCache, Result, Size,
        TextMetrics, TextRun,
    };

    #[cfg(feature = "glyph")]
    pub use crate::{FontRegistry, GlyphConfig, MonospaceSource};

    pub use crate::{core, render};
}

pub use framecache_core as core;
#[cfg(feature = "glyph")]
pub use framecache_glyph as glyph;
pub use framecache_render as render;
