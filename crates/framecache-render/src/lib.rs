#![forbid(unsafe_code)]

//! Render kernel: command recording, cell hashing, dirty regions, and replay.
//!
//! A frame flows through the kernel as follows:
//!
//! 1. [`RenderCache::begin_frame`] checks the backend's screen size.
//! 2. `record_*` calls append encoded [`Command`]s to a bounded
//!    [`CommandBuffer`].
//! 3. [`RenderCache::end_frame`] hashes every command into a [`CellGrid`],
//!    diffs it against the previous frame, merges changed cells into dirty
//!    rectangles, replays the buffer once per rectangle, presents, and only
//!    then releases fonts freed during the frame.

pub mod backend;
pub mod cache;
pub mod cell_grid;
pub mod command;
pub mod command_buffer;
pub mod compositor;
pub mod config;
pub mod dirty;
pub mod error;
pub mod hash;

pub use backend::Backend;
pub use cache::{FrameStats, RenderCache};
pub use cell_grid::{CellGrid, CellGridPair};
pub use command::Command;
pub use command_buffer::CommandBuffer;
pub use compositor::Compositor;
pub use config::CacheConfig;
pub use dirty::DirtyRegionBuilder;
pub use error::{ConfigError, RecordError};
