use serde::{Deserialize, Serialize};

/// A position in overlay window coordinates.
///
/// X grows to the right from the left screen edge. Y grows upward from the
/// bottom screen edge, since bubbles are laid out with bottom-left gravity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self { Point { x, y } }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Size = Size { width: 0, height: 0 };

    pub const fn new(width: i32, height: i32) -> Self { Size { width, height } }

    pub fn is_empty(&self) -> bool { self.width <= 0 || self.height <= 0 }
}

/// Integer rectangle stored as edges, with `left <= right` and `top <= bottom`.
///
/// `top` is simply the numerically smaller Y edge; no screen orientation is
/// implied. Clamp helpers treat both edges as inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Rect { left, top, right, bottom }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Rect::new(
            origin.x,
            origin.y,
            origin.x + size.width,
            origin.y + size.height,
        )
    }

    #[inline]
    pub fn width(&self) -> i32 { self.right - self.left }

    #[inline]
    pub fn height(&self) -> i32 { self.bottom - self.top }

    /// Open-interval overlap test: rectangles that only share an edge do not
    /// intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    pub fn clamp_x(&self, x: i32) -> i32 { x.max(self.left).min(self.right) }

    pub fn clamp_y(&self, y: i32) -> i32 { y.max(self.top).min(self.bottom) }
}
