//! Pure geometry for bubble placement.
//!
//! Two rectangles govern where a bubble may be. The movement bounds are what
//! the touch-tracking animation may reach, deliberately larger than the screen
//! so a flung bubble can overshoot. The position bounds are where a bubble may
//! come to rest, inset by the over-margin so it can sit partly off-screen.

use serde::{Deserialize, Serialize};

use crate::sys::geometry::{Point, Rect, Size};

/// Fraction of a second of fling velocity used to predict the release point.
const SIDE_CHANGE_THRESHOLD_SECS: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Left,
    Right,
}

impl Edge {
    pub fn is_right(self) -> bool { matches!(self, Edge::Right) }

    pub fn from_is_right(is_right: bool) -> Self { if is_right { Edge::Right } else { Edge::Left } }

    /// The resting X for this edge.
    pub fn x_in(self, bounds: &Rect) -> i32 {
        match self {
            Edge::Left => bounds.left,
            Edge::Right => bounds.right,
        }
    }
}

pub fn movement_bounds(widget: Size, screen: Size) -> Rect {
    Rect::new(
        -widget.width,
        -widget.height * 2,
        screen.width + widget.width,
        screen.height + widget.height,
    )
}

pub fn position_bounds(widget: Size, screen: Size, status_bar_height: i32, over_margin: i32) -> Rect {
    Rect::new(
        -over_margin,
        0,
        screen.width - widget.width + over_margin,
        screen.height - status_bar_height - widget.height,
    )
}

/// The X at which a bubble's left and right halves meet. A bubble exactly on
/// this line belongs to the left edge.
#[inline]
pub fn center_of_screen(widget_width: i32, screen_width: i32) -> i32 {
    (screen_width - widget_width) / 2
}

pub fn snap_target_x(current_x: i32, widget_width: i32, screen_width: i32, bounds: &Rect) -> (i32, Edge) {
    let edge = Edge::from_is_right(current_x > center_of_screen(widget_width, screen_width));
    (edge.x_in(bounds), edge)
}

pub fn clamp_y(y: i32, bounds: &Rect) -> i32 { bounds.clamp_y(y) }

/// Carries a resting Y across a change in the position bounds' height,
/// keeping its proportional place on screen.
pub fn rescale_y(old_y: i32, old_height: i32, new_bounds: &Rect) -> i32 {
    if old_height <= 0 {
        return clamp_y(old_y, new_bounds);
    }
    let scaled = (old_y as i64 * new_bounds.height() as i64) as f32 / old_height as f32;
    clamp_y((scaled + 0.5) as i32, new_bounds)
}

/// Resting position after the screen size changed: the bubble returns to the
/// edge of whichever half it was in, at the rescaled height.
pub fn relayout_on_resize(
    position: Point,
    widget: Size,
    new_screen_width: i32,
    old_bounds_height: i32,
    new_bounds: &Rect,
) -> Point {
    let (x, _) = snap_target_x(position.x, widget.width, new_screen_width, new_bounds);
    Point::new(x, rescale_y(position.y, old_bounds_height, new_bounds))
}

/// Edge pick that also considers where a fling would carry the bubble.
///
/// The bubble stays on its current side unless either its position or its
/// predicted position crosses the screen center.
pub fn snap_target_with_velocity(
    current_x: i32,
    widget_width: i32,
    screen_width: i32,
    velocity_x: f32,
    current: Edge,
    bounds: &Rect,
) -> (i32, Edge) {
    let center = center_of_screen(widget_width, screen_width);
    let future_x = (velocity_x * SIDE_CHANGE_THRESHOLD_SECS) as i32;
    let edge = match current {
        Edge::Right if current_x < center || current_x + future_x < center => Edge::Left,
        Edge::Left if current_x > center || current_x + future_x > center => Edge::Right,
        unchanged => unchanged,
    };
    (edge.x_in(bounds), edge)
}
