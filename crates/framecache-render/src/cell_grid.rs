#![forbid(unsafe_code)]

//! Double-buffered grid of per-cell content hashes.
//!
//! Every cell starts a frame at [`HASH_INITIAL`]. Hashing a frame folds each
//! drawing command's digest into every cell its clipped bounds touch. Diffing
//! compares against the previous frame cell by cell, resets each previous
//! slot to [`HASH_INITIAL`] right after reading it, then swaps the two grids.
//! The grid just read becomes the next frame's (already clean) target, so no
//! full clear is ever needed.
//!
//! # Invariants
//!
//! 1. Outside of `accumulate`/`diff_and_swap`, every cell of the current grid
//!    equals [`HASH_INITIAL`].
//! 2. Both grids always have identical dimensions.
//! 3. After `invalidate`, the next diff reports every cell.

use framecache_core::{Rect, Size};
use tracing::{debug, debug_span, trace};

use crate::command::Command;
use crate::command_buffer::CommandBuffer;
use crate::dirty::DirtyRegionBuilder;
use crate::hash::{HASH_INITIAL, command_digest, fnv1a};

/// Written into the previous grid on invalidation.
const INVALID: u32 = 0xFFFF_FFFF;

/// One generation of cell hashes, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    cols: usize,
    rows: usize,
    cells: Vec<u32>,
}

impl CellGrid {
    /// Grid of `cols * rows` cells, all set to [`HASH_INITIAL`].
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![HASH_INITIAL; cols * rows],
        }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Hash of the cell at (`col`, `row`).
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<u32> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    /// Raw row-major cell values.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.cells
    }

    fn resize(&mut self, cols: usize, rows: usize) {
        self.cols = cols;
        self.rows = rows;
        self.cells.clear();
        self.cells.resize(cols * rows, HASH_INITIAL);
    }

    fn fill(&mut self, value: u32) {
        self.cells.fill(value);
    }

    /// Fold `digest` into every cell overlapped by `bounds`.
    ///
    /// Overlap is inclusive: a rectangle ending exactly on a cell boundary
    /// also reaches the next cell.
    fn mix(&mut self, bounds: Rect, cell_size: i32, digest: u32) {
        if self.cells.is_empty() {
            return;
        }
        let clamp = |v: i32, max: usize| (v.max(0) as usize).min(max - 1);
        let x1 = clamp(bounds.x / cell_size, self.cols);
        let y1 = clamp(bounds.y / cell_size, self.rows);
        let x2 = clamp(bounds.right() / cell_size, self.cols);
        let y2 = clamp(bounds.bottom() / cell_size, self.rows);
        let bytes = digest.to_le_bytes();
        for row in y1..=y2 {
            let start = row * self.cols;
            for cell in &mut self.cells[start + x1..=start + x2] {
                fnv1a(cell, &bytes);
            }
        }
    }
}

/// The current and previous cell grids plus the invalidation flag.
#[derive(Debug, Clone)]
pub struct CellGridPair {
    grids: [CellGrid; 2],
    current: usize,
    force_all: bool,
    cell_size: i32,
}

impl CellGridPair {
    /// Empty pair. Call [`CellGridPair::reshape`] before use.
    pub fn new(cell_size: i32) -> Self {
        Self {
            grids: [CellGrid::new(0, 0), CellGrid::new(0, 0)],
            current: 0,
            force_all: true,
            cell_size,
        }
    }

    /// Grid extent for a screen: `ceil(dim / cell_size) + 1` per axis.
    pub fn dims_for(screen: Size, cell_size: i32) -> (usize, usize) {
        let axis = |d: i32| (d.max(0) as usize).div_ceil(cell_size as usize) + 1;
        (axis(screen.width), axis(screen.height))
    }

    #[inline]
    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// Resize both grids for a new screen and force a full repaint.
    pub fn reshape(&mut self, screen: Size) {
        let (cols, rows) = Self::dims_for(screen, self.cell_size);
        debug!(
            width = screen.width,
            height = screen.height,
            cols,
            rows,
            "reshaping cell grid"
        );
        for grid in &mut self.grids {
            grid.resize(cols, rows);
        }
        self.invalidate();
    }

    /// Make the next diff report every cell.
    pub fn invalidate(&mut self) {
        let prev = 1 - self.current;
        self.grids[prev].fill(INVALID);
        self.force_all = true;
    }

    /// Whether the next diff will report every cell.
    #[inline]
    pub fn is_invalidated(&self) -> bool {
        self.force_all
    }

    /// Grid currently accumulating this frame's hashes.
    #[inline]
    pub fn current(&self) -> &CellGrid {
        &self.grids[self.current]
    }

    /// Grid holding the last diffed frame's hashes.
    #[inline]
    pub fn previous(&self) -> &CellGrid {
        &self.grids[1 - self.current]
    }

    /// Maximum number of dirty rectangles for this grid: half the cells,
    /// rounded up.
    #[inline]
    pub fn dirty_limit(&self) -> usize {
        self.current().len().div_ceil(2)
    }

    /// Hash every drawing command in `buffer` into the current grid.
    ///
    /// The active clip starts as `screen` and is replaced by each `SetClip`.
    /// Returns the number of commands that reached at least one cell.
    pub fn accumulate(&mut self, buffer: &CommandBuffer, screen: Rect) -> usize {
        let _span = debug_span!("hash", commands = buffer.command_count()).entered();
        let cell_size = self.cell_size;
        let grid = &mut self.grids[self.current];
        let mut clip = screen;
        let mut hashed = 0;
        for record in buffer {
            let bounds = match record.command {
                Command::SetClip { rect } => {
                    clip = rect;
                    continue;
                }
                Command::FreeFont { .. } => continue,
                Command::DrawRect { rect, .. } | Command::DrawText { rect, .. } => rect,
            };
            let Some(effective) = bounds.intersection_opt(&clip) else {
                continue;
            };
            grid.mix(effective, cell_size, command_digest(record.bytes, effective));
            hashed += 1;
        }
        trace!(hashed, "hashed commands into cells");
        hashed
    }

    /// Compare the grids, seed `dirty` with every changed cell, reset the
    /// previous grid and swap. Returns the number of changed cells.
    pub fn diff_and_swap(&mut self, dirty: &mut DirtyRegionBuilder) -> usize {
        let _span = debug_span!("diff", full = self.force_all).entered();
        let force_all = self.force_all;
        let (cur, prev) = self.split();
        let cols = cur.cols;
        let mut changed = 0;
        for (idx, (c, p)) in cur.cells.iter().zip(prev.cells.iter_mut()).enumerate() {
            if force_all || *c != *p {
                dirty.push_cell((idx % cols) as i32, (idx / cols) as i32);
                changed += 1;
            }
            *p = HASH_INITIAL;
        }
        self.current = 1 - self.current;
        self.force_all = false;
        trace!(changed, "diffed cell grid");
        changed
    }

    fn split(&mut self) -> (&CellGrid, &mut CellGrid) {
        let [a, b] = &mut self.grids;
        if self.current == 0 { (&*a, b) } else { (&*b, a) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framecache_core::Color;

    fn rect_buffer(rects: &[(Rect, Color)]) -> CommandBuffer {
        let mut buf = CommandBuffer::with_capacity(4096);
        for &(rect, color) in rects {
            buf.push(&Command::DrawRect { rect, color }).unwrap();
        }
        buf
    }

    fn frame(pair: &mut CellGridPair, buf: &CommandBuffer, screen: Size) -> Vec<Rect> {
        pair.accumulate(buf, screen.to_rect());
        let mut dirty = DirtyRegionBuilder::with_limit(pair.dirty_limit());
        pair.diff_and_swap(&mut dirty);
        dirty.cells().to_vec()
    }

    #[test]
    fn dims_round_up_plus_one() {
        assert_eq!(CellGridPair::dims_for(Size::new(960, 540), 96), (11, 7));
        assert_eq!(CellGridPair::dims_for(Size::new(1, 1), 96), (2, 2));
        assert_eq!(CellGridPair::dims_for(Size::new(0, 0), 96), (1, 1));
    }

    #[test]
    fn reshape_forces_every_cell_dirty() {
        let mut pair = CellGridPair::new(96);
        let screen = Size::new(192, 96);
        pair.reshape(screen);
        let mut dirty = DirtyRegionBuilder::with_limit(pair.dirty_limit());
        let changed = pair.diff_and_swap(&mut dirty);
        assert_eq!(changed, 3 * 2);
        assert!(!pair.is_invalidated());
    }

    #[test]
    fn untouched_frame_after_bootstrap_is_clean() {
        let mut pair = CellGridPair::new(96);
        let screen = Size::new(300, 200);
        pair.reshape(screen);
        let empty = CommandBuffer::with_capacity(64);
        assert!(!frame(&mut pair, &empty, screen).is_empty());
        assert!(frame(&mut pair, &empty, screen).is_empty());
    }

    #[test]
    fn current_grid_is_clean_after_swap() {
        let mut pair = CellGridPair::new(96);
        let screen = Size::new(300, 200);
        pair.reshape(screen);
        let buf = rect_buffer(&[(Rect::new(0, 0, 300, 200), Color::RED)]);
        frame(&mut pair, &buf, screen);
        assert!(pair.current().as_slice().iter().all(|&h| h == HASH_INITIAL));
        assert!(pair.previous().as_slice().iter().any(|&h| h != HASH_INITIAL));
    }

    #[test]
    fn inclusive_edge_reaches_next_cell() {
        let mut pair = CellGridPair::new(96);
        pair.reshape(Size::new(400, 400));
        let buf = rect_buffer(&[(Rect::new(0, 0, 96, 10), Color::RED)]);
        pair.accumulate(&buf, Rect::from_size(400, 400));
        let grid = pair.current();
        assert_ne!(grid.get(0, 0), Some(HASH_INITIAL));
        assert_ne!(grid.get(1, 0), Some(HASH_INITIAL));
        assert_eq!(grid.get(2, 0), Some(HASH_INITIAL));
        assert_eq!(grid.get(0, 1), Some(HASH_INITIAL));
    }

    #[test]
    fn fully_clipped_command_contributes_nothing() {
        let mut pair = CellGridPair::new(96);
        pair.reshape(Size::new(400, 400));
        let mut buf = CommandBuffer::with_capacity(256);
        buf.push(&Command::SetClip {
            rect: Rect::new(300, 300, 10, 10),
        })
        .unwrap();
        buf.push(&Command::DrawRect {
            rect: Rect::new(0, 0, 50, 50),
            color: Color::RED,
        })
        .unwrap();
        assert_eq!(pair.accumulate(&buf, Rect::from_size(400, 400)), 0);
        assert!(pair.current().as_slice().iter().all(|&h| h == HASH_INITIAL));
    }

    #[test]
    fn changed_rect_marks_only_its_cells() {
        let mut pair = CellGridPair::new(96);
        let screen = Size::new(960, 960);
        pair.reshape(screen);
        let a = rect_buffer(&[(Rect::new(10, 10, 20, 20), Color::RED)]);
        let b = rect_buffer(&[(Rect::new(10, 10, 20, 20), Color::BLUE)]);
        frame(&mut pair, &a, screen);
        let dirty = frame(&mut pair, &b, screen);
        assert_eq!(dirty, vec![Rect::new(0, 0, 1, 1)]);
    }
}
