#![forbid(unsafe_code)]

//! Glyph cache configuration.

use crate::error::GlyphError;

/// Configuration for per-font page caching and atlas baking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphConfig {
    /// Number of code pages retained per font.
    pub page_cache_size: usize,
    /// Side length of the first atlas attempt for a page.
    /// Doubled on every overflow.
    pub initial_atlas_size: u32,
    /// Empty pixels kept around every glyph in the atlas.
    pub padding: u32,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            page_cache_size: 256,
            initial_atlas_size: 128,
            padding: 1,
        }
    }
}

impl GlyphConfig {
    /// Create a config retaining `page_cache_size` pages per font.
    pub fn with_page_cache_size(page_cache_size: usize) -> Self {
        Self {
            page_cache_size,
            ..Default::default()
        }
    }

    /// Builder: set the first atlas side length.
    #[must_use]
    pub fn initial_atlas_size(mut self, side: u32) -> Self {
        self.initial_atlas_size = side;
        self
    }

    /// Builder: set glyph padding.
    #[must_use]
    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Reject configurations that could never bake a page.
    pub fn validate(&self) -> Result<(), GlyphError> {
        if self.page_cache_size == 0 {
            return Err(GlyphError::InvalidConfig("page_cache_size must be > 0"));
        }
        if self.initial_atlas_size == 0 {
            return Err(GlyphError::InvalidConfig("initial_atlas_size must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(GlyphConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_pages_rejected() {
        let err = GlyphConfig::with_page_cache_size(0).validate().unwrap_err();
        assert!(matches!(err, GlyphError::InvalidConfig(_)));
    }

    #[test]
    fn zero_atlas_rejected() {
        let cfg = GlyphConfig::default().initial_atlas_size(0);
        assert!(cfg.validate().is_err());
    }
}
