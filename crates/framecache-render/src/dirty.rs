#![forbid(unsafe_code)]

//! Greedy merging of changed cells into covering rectangles.
//!
//! Seeds arrive in cell coordinates, one cell at a time. Each seed is folded
//! into the most recently accepted rectangle it touches (shared edges and
//! corners count), otherwise appended. The accepted list is capped; once the
//! cap is reached, seeds that touch nothing are folded into the last entry.
//!
//! # Invariants
//!
//! 1. The union of accepted rectangles covers the union of all seeds.
//! 2. `rects.len() <= max(limit, 1)`.
//! 3. Accepted rectangles only ever grow.

use framecache_core::Rect;

/// Accumulates dirty cells for one frame.
#[derive(Debug, Clone, Default)]
pub struct DirtyRegionBuilder {
    rects: Vec<Rect>,
    limit: usize,
    seeds: usize,
}

impl DirtyRegionBuilder {
    /// Builder that accepts at most `limit` rectangles.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            rects: Vec::with_capacity(limit),
            limit,
            seeds: 0,
        }
    }

    /// Clear for a new frame and set the rectangle cap.
    pub fn reset(&mut self, limit: usize) {
        self.rects.clear();
        self.limit = limit;
        self.seeds = 0;
        if self.rects.capacity() < limit {
            self.rects.reserve(limit);
        }
    }

    /// Add the single cell at (`col`, `row`).
    #[inline]
    pub fn push_cell(&mut self, col: i32, row: i32) {
        self.push(Rect::new(col, row, 1, 1));
    }

    /// Add a seed rectangle in cell coordinates.
    pub fn push(&mut self, seed: Rect) {
        self.seeds += 1;
        if let Some(hit) = self.rects.iter_mut().rev().find(|r| r.touches(&seed)) {
            *hit = hit.union(&seed);
            return;
        }
        if self.rects.len() < self.limit || self.rects.is_empty() {
            self.rects.push(seed);
        } else if let Some(last) = self.rects.last_mut() {
            *last = last.union(&seed);
        }
    }

    /// Accepted rectangles in cell coordinates, in discovery order.
    #[inline]
    pub fn cells(&self) -> &[Rect] {
        &self.rects
    }

    /// Number of seeds pushed since the last reset.
    #[inline]
    pub fn seed_count(&self) -> usize {
        self.seeds
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Scale accepted rectangles to pixels and clip them to `screen`.
    ///
    /// Rectangles that fall entirely off-screen are dropped.
    pub fn to_pixels(&self, cell_size: i32, screen: Rect, out: &mut Vec<Rect>) {
        out.clear();
        out.extend(
            self.rects
                .iter()
                .filter_map(|r| r.scale(cell_size).intersection_opt(&screen)),
        );
    }
}
