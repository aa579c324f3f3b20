#![forbid(unsafe_code)]

//! Headless backends and a scripted scene for exercising the frame cache.
//!
//! - [`Canvas`]: software RGBA framebuffer with clipping and blending. Pixels
//!   persist across frames, so partial repaints can be checked against full
//!   ones pixel for pixel.
//! - [`RecordingBackend`]: logs every backend call in order.
//! - [`EditorScene`]: deterministic editor-like frames for demos and benches.

pub mod canvas;
pub mod recording;
pub mod scene;

pub use canvas::{Canvas, CanvasStats};
pub use recording::{BackendEvent, RecordingBackend};
pub use scene::EditorScene;
