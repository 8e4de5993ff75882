//! Integer rectangles in frame space.
//!
//! Origin is the top-left corner, X grows right and Y grows down. The
//! origin is signed so that boxes computed from text layout may start
//! outside the frame; [`Rect::clip`] reduces them to the visible part.

/// An axis-aligned rectangle with a signed origin.
///
/// # Example
///
/// ```rust
/// use seqfx_core::Rect;
///
/// let r = Rect::new(-4, 2, 10, 3).clip(8, 8).unwrap();
/// assert_eq!(r, Rect::new(0, 2, 6, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (inclusive)
    pub x: i32,
    /// Top edge (inclusive)
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a rectangle from origin and size.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from inclusive-exclusive edges.
    ///
    /// Inverted edges produce an empty rectangle.
    pub fn from_edges(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            x: xmin,
            y: ymin,
            width: (xmax - xmin).max(0) as u32,
            height: (ymax - ymin).max(0) as u32,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Returns `true` for zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the point lies inside.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersects with a `width` x `height` frame, `None` when nothing is visible.
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        let xmin = self.x.max(0);
        let ymin = self.y.max(0);
        let xmax = self.right().min(width as i32);
        let ymax = self.bottom().min(height as i32);
        let r = Rect::from_edges(xmin, ymin, xmax, ymax);
        (!r.is_empty()).then_some(r)
    }
}
