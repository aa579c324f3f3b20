#![forbid(unsafe_code)]

use std::fmt;

use framecache_core::FontId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphError {
    /// The handle does not refer to a live font.
    MissingFont(FontId),
    /// Rasterizer returned a bitmap whose size does not match its dimensions.
    InvalidRaster { codepoint: u32 },
    /// A page could not be packed even at the largest atlas size.
    AtlasOverflow { page: u32, side: u32 },
    /// Configuration value out of range.
    InvalidConfig(&'static str),
}

impl fmt::Display for GlyphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFont(id) => {
                write!(f, "font {}:{} is not loaded", id.index(), id.generation())
            }
            Self::InvalidRaster { codepoint } => {
                write!(f, "invalid raster for U+{codepoint:04X} (bitmap size mismatch)")
            }
            Self::AtlasOverflow { page, side } => {
                write!(f, "glyph page {page} does not fit a {side}x{side} atlas")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid glyph config: {msg}"),
        }
    }
}

impl std::error::Error for GlyphError {}
