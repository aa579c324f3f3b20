#![forbid(unsafe_code)]

//! Core: pixel geometry, packed colors, font handles, and the text metrics seam.

pub mod color;
pub mod font;
pub mod geometry;

pub use color::Color;
pub use font::{FontId, TextMetrics, TextRun};
pub use geometry::{Rect, Size};
