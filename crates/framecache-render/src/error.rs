#![forbid(unsafe_code)]

use std::fmt;

use framecache_core::FontId;

/// Why a drawing call recorded nothing.
///
/// None of these are fatal. The `record_*` methods on
/// [`RenderCache`](crate::RenderCache) log and swallow them; the `try_record_*`
/// variants hand them back for callers that want to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// The command buffer has no room for this record this frame.
    BufferExhausted { needed: usize, remaining: usize },
    /// The font handle does not refer to a live font.
    MissingFont(FontId),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferExhausted { needed, remaining } => write!(
                f,
                "command buffer exhausted ({needed} bytes needed, {remaining} remaining)"
            ),
            Self::MissingFont(id) => {
                write!(f, "font {}:{} is not loaded", id.index(), id.generation())
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// Invalid [`CacheConfig`](crate::CacheConfig) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Cell size must be a positive number of pixels.
    CellSize(i32),
    /// The command buffer must hold at least one record.
    BufferCapacity(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellSize(size) => write!(f, "cell size must be > 0 (got {size})"),
            Self::BufferCapacity(bytes) => {
                write!(f, "command buffer capacity too small ({bytes} bytes)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
