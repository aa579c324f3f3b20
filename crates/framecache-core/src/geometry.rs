#![forbid(unsafe_code)]

//! Geometric primitives in pixel space.

/// A rectangle for clip regions, draw bounds, and dirty regions.
///
/// Uses pixel coordinates (origin at top-left). Coordinates are signed so
/// that text and shapes may start off-screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Area in pixels. Zero for empty rectangles.
    #[inline]
    pub const fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width as u64 * self.height as u64
        }
    }

    /// Check if the rectangle has zero (or negative) extent.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if `other` lies entirely within this rectangle.
    ///
    /// Empty rectangles are contained by everything.
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Overlap test where touching edges count as overlapping.
    ///
    /// This is deliberately looser than [`Rect::intersection`]: two cells that
    /// share an edge or a corner "touch" and are candidates for merging.
    #[inline]
    pub const fn touches(&self, other: &Rect) -> bool {
        other.right() >= self.x
            && other.x <= self.right()
            && other.bottom() >= self.y
            && other.y <= self.bottom()
    }

    /// Compute the intersection with another rectangle.
    ///
    /// The result keeps the clamped origin and has zero width or height when
    /// the rectangles don't overlap.
    #[inline]
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Rect::new(x1, y1, (x2 - x1).max(0), (y2 - y1).max(0))
    }

    /// Compute the intersection, returning `None` if it is empty.
    #[inline]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let r = self.intersection(other);
        (!r.is_empty()).then_some(r)
    }

    /// The smallest rectangle that contains both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Multiply every component by `factor` (cell space to pixel space).
    #[inline]
    pub const fn scale(&self, factor: i32) -> Rect {
        Rect::new(
            self.x.saturating_mul(factor),
            self.y.saturating_mul(factor),
            self.width.saturating_mul(factor),
            self.height.saturating_mul(factor),
        )
    }

    /// Little-endian encoding of the four components.
    #[inline]
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.x.to_le_bytes());
        out[4..8].copy_from_slice(&self.y.to_le_bytes());
        out[8..12].copy_from_slice(&self.width.to_le_bytes());
        out[12..16].copy_from_slice(&self.height.to_le_bytes());
        out
    }

    /// Inverse of [`Rect::to_le_bytes`].
    #[inline]
    pub fn from_le_bytes(bytes: [u8; 16]) -> Rect {
        let word =
            |i: usize| i32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Rect::new(word(0), word(4), word(8), word(12))
    }
}

/// Screen dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// The rectangle at the origin with this size.
    #[inline]
    pub const fn to_rect(self) -> Rect {
        Rect::from_size(self.width, self.height)
    }
}

impl From<(i32, i32)> for Size {
    fn from((width, height): (i32, i32)) -> Self {
        Self::new(width, height)
    }
}
