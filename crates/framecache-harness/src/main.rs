#![forbid(unsafe_code)]

//! Headless frame cache driver.
//!
//! Runs the scripted editor scene on a software canvas and prints one JSON
//! line of frame statistics per frame, followed by a summary line. Halfway
//! through, the canvas is resized to exercise full invalidation.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=framecache_render=debug cargo run -p framecache-harness
//! ```
//!
//! # Environment
//!
//! - `FRAMECACHE_CELL_SIZE`: hash cell edge in pixels (default 96)
//! - `FRAMECACHE_BUFFER_BYTES`: command buffer capacity (default 512 KiB)
//! - `FRAMECACHE_DEBUG_OVERLAY`: tint repainted regions
//! - `FRAMECACHE_FRAMES`: number of frames to run (default 120)
//! - `FRAMECACHE_LOG_JSON`: emit logs as JSON

use std::process::ExitCode;

use framecache_glyph::{FontRegistry, MonospaceSource};
use framecache_harness::{Canvas, EditorScene};
use framecache_render::{CacheConfig, FrameStats, RenderCache};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const WIDTH: i32 = 1280;
const HEIGHT: i32 = 720;
const DEFAULT_FRAMES: u64 = 120;

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(matches!(
        trimmed,
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON"
    ))
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if env_flag("FRAMECACHE_LOG_JSON").unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn config_from_env() -> CacheConfig {
    let mut config = CacheConfig::default();
    if let Some(size) = env_u64("FRAMECACHE_CELL_SIZE") {
        config.cell_size = i32::try_from(size).unwrap_or(i32::MAX);
    }
    if let Some(bytes) = env_u64("FRAMECACHE_BUFFER_BYTES") {
        config.command_buffer_bytes = usize::try_from(bytes).unwrap_or(usize::MAX);
    }
    if let Some(overlay) = env_flag("FRAMECACHE_DEBUG_OVERLAY") {
        config.debug_overlay = overlay;
    }
    config
}

fn stats_line(stats: &FrameStats) -> serde_json::Value {
    json!({
        "frame": stats.frame,
        "commands": stats.commands,
        "dropped": stats.dropped,
        "dirty_cells": stats.dirty_cells,
        "dirty_rects": stats.dirty_rects,
        "dirty_area": stats.dirty_area,
        "fonts_released": stats.fonts_released,
        "full_repaint": stats.full_repaint,
    })
}

fn main() -> ExitCode {
    init_logging();

    let config = config_from_env();
    let frames = env_u64("FRAMECACHE_FRAMES").unwrap_or(DEFAULT_FRAMES);

    let mut fonts = FontRegistry::new();
    let font = fonts.load(MonospaceSource::new(8.0), 16.0);
    let canvas = Canvas::new(WIDTH, HEIGHT, fonts);
    let mut cache = match RenderCache::with_config(canvas, config) {
        Ok(cache) => cache,
        Err(err) => {
            error!(%err, "invalid cache configuration");
            return ExitCode::from(2);
        }
    };
    info!(
        cell_size = config.cell_size,
        buffer_bytes = config.command_buffer_bytes,
        frames,
        "starting harness"
    );

    let mut scene = EditorScene::new(font);
    let mut repainted = 0u64;
    let mut full_repaints = 0u64;
    let mut dropped = 0usize;
    for frame in 0..frames {
        if frame == frames / 2 && frame > 0 {
            cache.backend_mut().resize(WIDTH * 3 / 4, HEIGHT * 3 / 4);
        }
        cache.begin_frame();
        scene.draw(&mut cache);
        cache.end_frame();

        let stats = cache.last_frame_stats();
        repainted += stats.dirty_area;
        full_repaints += u64::from(stats.full_repaint);
        dropped += stats.dropped;
        println!("{}", stats_line(&stats));
    }

    let canvas = cache.into_backend();
    let glyphs = canvas.fonts().stats();
    println!(
        "{}",
        json!({
            "summary": {
                "frames": frames,
                "full_repaints": full_repaints,
                "repainted_area": repainted,
                "dropped": dropped,
                "pixels_written": canvas.stats().pixels_written,
                "presents": canvas.stats().presents,
                "glyph_pages_baked": glyphs.pages_baked,
                "glyph_bake_retries": glyphs.bake_retries,
                "glyph_lookups": glyphs.lookups,
            }
        })
    );
    ExitCode::SUCCESS
}
