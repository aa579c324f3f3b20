#![forbid(unsafe_code)]

//! End-to-end frame behavior against a recording backend.

mod common;

use common::{Event, Recorder, covers};
use framecache_core::{Color, Rect};
use framecache_render::{CacheConfig, RenderCache};

fn cache(width: i32, height: i32) -> RenderCache<Recorder> {
    RenderCache::new(Recorder::new(width, height))
}

fn frame(cache: &mut RenderCache<Recorder>, draw: impl FnOnce(&mut RenderCache<Recorder>)) {
    cache.begin_frame();
    draw(cache);
    cache.end_frame();
}

#[test]
fn second_empty_frame_has_no_dirty_rects() {
    let mut cache = cache(960, 540);
    frame(&mut cache, |_| {});
    assert!(!cache.last_dirty_rects().is_empty());
    cache.backend_mut().take();

    frame(&mut cache, |_| {});
    assert!(cache.last_dirty_rects().is_empty());
    assert!(cache.backend().events.is_empty(), "clean frame must not touch the backend");
}

#[test]
fn identical_frames_are_clean() {
    let mut cache = cache(960, 540);
    let font = cache.backend_mut().load_font();
    let scene = |c: &mut RenderCache<Recorder>| {
        c.record_draw_rect(Rect::new(0, 0, 960, 540), Color::BLACK);
        c.record_set_clip(Rect::new(100, 100, 300, 200));
        c.record_draw_text(font, "status: ok", 110, 110, Color::WHITE);
        c.record_draw_rect(Rect::new(120, 140, 30, 30), Color::GREEN);
    };
    frame(&mut cache, scene);
    frame(&mut cache, scene);
    assert!(cache.last_dirty_rects().is_empty());
    assert_eq!(cache.last_frame_stats().dirty_cells, 0);
}

#[test]
fn invalidate_all_then_draw_covers_rect() {
    let mut cache = cache(960, 540);
    let r = Rect::new(150, 70, 333, 222);
    frame(&mut cache, |c| c.record_draw_rect(r, Color::RED));
    frame(&mut cache, |c| c.record_draw_rect(r, Color::RED));
    assert!(cache.last_dirty_rects().is_empty());

    cache.invalidate_all();
    frame(&mut cache, |c| c.record_draw_rect(r, Color::RED));
    assert!(cache.last_frame_stats().full_repaint);
    assert!(covers(cache.last_dirty_rects(), r));
}

#[test]
fn moved_rect_covers_old_and_new_position() {
    let mut cache = cache(960, 540);
    let old = Rect::new(10, 10, 40, 40);
    let new = Rect::new(500, 300, 40, 40);
    frame(&mut cache, |c| c.record_draw_rect(old, Color::BLUE));
    frame(&mut cache, |c| c.record_draw_rect(new, Color::BLUE));
    let dirty = cache.last_dirty_rects();
    assert!(covers(dirty, old));
    assert!(covers(dirty, new));
    assert_eq!(dirty.len(), 2);
}

#[test]
fn draw_order_changes_cell_hash() {
    let r = Rect::new(10, 10, 50, 50);
    let mut both = cache(960, 540);
    let mut blue_only = cache(960, 540);
    frame(&mut both, |c| {
        c.record_draw_rect(r, Color::RED);
        c.record_draw_rect(r, Color::BLUE);
    });
    frame(&mut blue_only, |c| c.record_draw_rect(r, Color::BLUE));

    let a = both.last_frame_hashes();
    let b = blue_only.last_frame_hashes();
    assert_ne!(a.get(0, 0), b.get(0, 0));
    // Cells no command reached agree.
    assert_eq!(a.get(5, 5), b.get(5, 5));
}

#[test]
fn single_alpha_bit_marks_cells_dirty() {
    let mut cache = cache(960, 540);
    let r = Rect::new(200, 200, 20, 20);
    frame(&mut cache, |c| c.record_draw_rect(r, Color::rgba(255, 0, 0, 255)));
    frame(&mut cache, |c| c.record_draw_rect(r, Color::rgba(255, 0, 0, 254)));
    assert!(covers(cache.last_dirty_rects(), r));
}

#[test]
fn clip_change_on_unchanged_command_is_detected() {
    let mut cache = cache(960, 540);
    let r = Rect::new(0, 0, 90, 90);
    frame(&mut cache, |c| {
        c.record_set_clip(Rect::new(0, 0, 50, 50));
        c.record_draw_rect(r, Color::RED);
    });
    frame(&mut cache, |c| {
        c.record_set_clip(Rect::new(0, 0, 60, 60));
        c.record_draw_rect(r, Color::RED);
    });
    assert!(covers(cache.last_dirty_rects(), Rect::new(0, 0, 60, 60)));
}

#[test]
fn font_release_waits_for_every_replay_pass() {
    let mut cache = cache(960, 540);
    let font = cache.backend_mut().load_font();
    frame(&mut cache, |c| {
        c.record_draw_text(font, "hello", 10, 10, Color::WHITE);
        c.record_draw_text(font, "hello", 700, 400, Color::WHITE);
    });
    cache.backend_mut().take();

    frame(&mut cache, |c| {
        c.record_draw_text(font, "hello", 10, 30, Color::WHITE);
        c.record_release_font(font);
        c.record_draw_text(font, "hello", 700, 420, Color::WHITE);
    });
    assert_eq!(cache.last_dirty_rects().len(), 2);

    let events = cache.backend_mut().take();
    let texts: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, Event::Text { .. }))
        .map(|(i, _)| i)
        .collect();
    // Two texts per pass, two passes.
    assert_eq!(texts.len(), 4);
    let present = events
        .iter()
        .position(|e| matches!(e, Event::Present(_)))
        .unwrap();
    let release = events.iter().position(|e| *e == Event::Release(font)).unwrap();
    assert!(texts.iter().all(|&i| i < present));
    assert!(present < release);
    assert_eq!(release, events.len() - 1);
    assert!(!cache.backend().fonts.contains(font));
}

#[test]
fn released_font_is_missing_next_frame() {
    let mut cache = cache(320, 240);
    let font = cache.backend_mut().load_font();
    frame(&mut cache, |c| c.record_release_font(font));
    assert_eq!(cache.last_frame_stats().fonts_released, 1);

    cache.begin_frame();
    assert_eq!(cache.record_draw_text(font, "gone", 4, 4, Color::WHITE), 4);
    assert!(cache.command_buffer().is_empty());
    cache.end_frame();
}

#[test]
fn resize_repaints_every_cell() {
    let mut cache = cache(300, 200);
    frame(&mut cache, |c| c.record_draw_rect(Rect::new(0, 0, 10, 10), Color::RED));
    frame(&mut cache, |c| c.record_draw_rect(Rect::new(0, 0, 10, 10), Color::RED));
    assert!(cache.last_dirty_rects().is_empty());

    cache.backend_mut().size = (400, 300).into();
    frame(&mut cache, |c| c.record_draw_rect(Rect::new(0, 0, 10, 10), Color::RED));
    let stats = cache.last_frame_stats();
    assert!(stats.full_repaint);
    assert_eq!(stats.dirty_cells, 6 * 5);
    assert_eq!(cache.last_dirty_rects(), &[Rect::from_size(400, 300)]);
}

#[test]
fn exhausted_buffer_keeps_earlier_commands() {
    let config = CacheConfig::with_buffer_bytes(3 * 25);
    let mut cache = RenderCache::with_config(Recorder::new(960, 540), config).unwrap();
    frame(&mut cache, |c| {
        for i in 0..5 {
            c.record_draw_rect(Rect::new(i * 100, 0, 10, 10), Color::RED);
        }
    });
    let stats = cache.last_frame_stats();
    assert_eq!(stats.commands, 3);
    assert_eq!(stats.dropped, 2);

    let drawn: Vec<Rect> = cache
        .backend()
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Rect(r, _) => Some(*r),
            _ => None,
        })
        .collect();
    assert_eq!(
        drawn,
        vec![
            Rect::new(0, 0, 10, 10),
            Rect::new(100, 0, 10, 10),
            Rect::new(200, 0, 10, 10)
        ]
    );
}

#[test]
fn debug_overlay_tints_each_dirty_rect() {
    let mut cache = cache(960, 540);
    frame(&mut cache, |_| {});
    cache.set_debug_overlay(true);
    cache.backend_mut().take();

    frame(&mut cache, |c| {
        c.record_draw_rect(Rect::new(0, 0, 10, 10), Color::RED);
        c.record_draw_rect(Rect::new(600, 400, 10, 10), Color::RED);
    });
    let dirty = cache.last_dirty_rects().to_vec();
    assert_eq!(dirty.len(), 2);
    let tints: Vec<_> = cache
        .backend()
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Rect(r, c) if c.a() == 50 => Some(*r),
            _ => None,
        })
        .collect();
    assert_eq!(tints, dirty);
}
