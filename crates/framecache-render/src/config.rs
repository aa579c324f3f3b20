#![forbid(unsafe_code)]

//! Cache configuration.

use crate::command::HEADER_LEN;
use crate::command_buffer::DEFAULT_CAPACITY;
use crate::error::ConfigError;

/// Default cell edge in pixels.
pub const DEFAULT_CELL_SIZE: i32 = 96;

/// Seed for the debug overlay color generator.
pub const DEFAULT_OVERLAY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Smallest record the buffer can hold (a `FreeFont`).
const MIN_RECORD_LEN: usize = HEADER_LEN + 8;

/// Tunables for a [`RenderCache`](crate::RenderCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Edge length of a hash cell in pixels.
    pub cell_size: i32,
    /// Fixed byte capacity of the per-frame command buffer.
    pub command_buffer_bytes: usize,
    /// Tint every repainted rectangle with a random translucent color.
    pub debug_overlay: bool,
    /// Seed for overlay colors. Fixed so overlay output is reproducible.
    pub overlay_seed: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            command_buffer_bytes: DEFAULT_CAPACITY,
            debug_overlay: false,
            overlay_seed: DEFAULT_OVERLAY_SEED,
        }
    }
}

impl CacheConfig {
    /// Config with a custom cell size.
    pub fn with_cell_size(cell_size: i32) -> Self {
        Self {
            cell_size,
            ..Default::default()
        }
    }

    /// Config with a custom command buffer capacity.
    pub fn with_buffer_bytes(command_buffer_bytes: usize) -> Self {
        Self {
            command_buffer_bytes,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn cell_size(mut self, cell_size: i32) -> Self {
        self.cell_size = cell_size;
        self
    }

    #[must_use]
    pub fn buffer_bytes(mut self, bytes: usize) -> Self {
        self.command_buffer_bytes = bytes;
        self
    }

    #[must_use]
    pub fn debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay = enabled;
        self
    }

    #[must_use]
    pub fn overlay_seed(mut self, seed: u64) -> Self {
        self.overlay_seed = seed;
        self
    }

    /// Check that the values describe a usable cache.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size <= 0 {
            return Err(ConfigError::CellSize(self.cell_size));
        }
        if self.command_buffer_bytes < MIN_RECORD_LEN {
            return Err(ConfigError::BufferCapacity(self.command_buffer_bytes));
        }
        Ok(())
    }
}
